//! Wire records exchanged with the control plane.

use chrono::{DateTime, Utc};
use labvt_model::{Instance, ObjectKey};
use serde::{Deserialize, Serialize};

use crate::{ChangeEvent, EventError, EventId, UpdateKind};

/// A change record as delivered by the event transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchRecord {
    pub event_id: EventId,

    /// `ADDED`, `MODIFIED` or `DELETED`.
    #[serde(rename = "type")]
    pub kind: String,

    pub namespace: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
}

impl WatchRecord {
    /// Decodes the record into a change event.
    ///
    /// An unknown kind or an invalid key is an error. A snapshot that fails
    /// to decode is dropped, leaving a malformed event for the consumer to skip.
    pub fn decode(&self) -> Result<ChangeEvent, EventError> {
        let kind = UpdateKind::parse(&self.kind)?;
        let key = ObjectKey::parse(&format!("{}/{}", self.namespace, self.name))?;
        let object = self
            .object
            .as_ref()
            .filter(|value| !value.is_null())
            .and_then(|value| serde_json::from_value::<Instance>(value.clone()).ok());

        Ok(ChangeEvent { kind, key, object })
    }

    /// Returns true if the record carried a snapshot.
    pub fn has_object(&self) -> bool {
        self.object.as_ref().is_some_and(|value| !value.is_null())
    }
}

/// A page of change records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsPage {
    pub items: Vec<WatchRecord>,
    pub next_after_event_id: EventId,
}

/// Authoritative list of the instances visible in a tenant scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceList {
    pub items: Vec<Instance>,
    /// Stream position the list is consistent with.
    pub cursor: EventId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn object(name: &str) -> serde_json::Value {
        serde_json::json!({
            "metadata": {"name": name, "namespace": "tenant-tester"},
            "spec": {"template": {"name": "kubernetes"}, "tenant": {"name": "tester"}},
            "status": {"phase": "running"}
        })
    }

    fn record(kind: &str, name: &str, object: Option<serde_json::Value>) -> WatchRecord {
        WatchRecord {
            event_id: EventId::new(7),
            kind: kind.to_string(),
            namespace: "tenant-tester".to_string(),
            name: name.to_string(),
            object,
            occurred_at: None,
        }
    }

    #[rstest]
    #[case("ADDED", UpdateKind::Added)]
    #[case("MODIFIED", UpdateKind::Modified)]
    #[case("DELETED", UpdateKind::Deleted)]
    fn test_decode_kinds(#[case] kind: &str, #[case] expected: UpdateKind) {
        let event = record(kind, "a", Some(object("a"))).decode().unwrap();
        assert_eq!(event.kind, expected);
        assert_eq!(event.key, ObjectKey::new("tenant-tester", "a"));
        assert!(event.snapshot().is_some());
    }

    #[test]
    fn test_decode_unknown_kind() {
        let err = record("BOOKMARK", "a", None).decode().unwrap_err();
        assert!(matches!(err, EventError::UnknownUpdateKind(_)));
    }

    #[test]
    fn test_decode_invalid_key() {
        let err = record("DELETED", "", None).decode().unwrap_err();
        assert!(matches!(err, EventError::InvalidKey(_)));
    }

    #[test]
    fn test_decode_bad_object_is_malformed() {
        let rec = record("MODIFIED", "a", Some(serde_json::json!({"metadata": 3})));
        let event = rec.decode().unwrap();
        assert!(rec.has_object());
        assert!(event.object.is_none());
        assert!(event.is_malformed());
    }

    #[test]
    fn test_decode_null_object() {
        let rec = record("DELETED", "a", Some(serde_json::Value::Null));
        assert!(!rec.has_object());
        let event = rec.decode().unwrap();
        assert!(event.object.is_none());
        assert!(!event.is_malformed());
    }

    #[test]
    fn test_events_page_json() {
        let json = serde_json::json!({
            "items": [{"event_id": 3, "type": "DELETED", "namespace": "ns", "name": "a"}],
            "next_after_event_id": 3
        });
        let page: EventsPage = serde_json::from_value(json).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_after_event_id, EventId::new(3));
        assert!(page.items[0].object.is_none());
    }
}
