//! Change event definitions.

use labvt_model::{Instance, ObjectKey};
use serde::{Deserialize, Serialize};

// =============================================================================
// Event ID
// =============================================================================

/// Position of a record in the change stream.
///
/// Monotonic per tenant scope; only meaningful as a resume cursor while the
/// stream stays connected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EventId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// =============================================================================
// Update Kind
// =============================================================================

/// What happened to an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateKind {
    Added,
    Modified,
    Deleted,
}

impl UpdateKind {
    /// Parses the wire representation (`ADDED`, `MODIFIED`, `DELETED`).
    pub fn parse(s: &str) -> Result<Self, crate::EventError> {
        match s {
            "ADDED" => Ok(Self::Added),
            "MODIFIED" => Ok(Self::Modified),
            "DELETED" => Ok(Self::Deleted),
            other => Err(crate::EventError::UnknownUpdateKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateKind::Added => write!(f, "added"),
            UpdateKind::Modified => write!(f, "modified"),
            UpdateKind::Deleted => write!(f, "deleted"),
        }
    }
}

// =============================================================================
// Change Event
// =============================================================================

/// A single change to the set of visible instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: UpdateKind,
    pub key: ObjectKey,
    /// Full snapshot after the change. Optional for deletes; an added or
    /// modified event without one is malformed.
    pub object: Option<Instance>,
}

impl ChangeEvent {
    pub fn added(instance: Instance) -> Self {
        Self::with_snapshot(UpdateKind::Added, instance)
    }

    pub fn modified(instance: Instance) -> Self {
        Self::with_snapshot(UpdateKind::Modified, instance)
    }

    /// A delete carrying only the identity.
    pub fn deleted(key: ObjectKey) -> Self {
        Self {
            kind: UpdateKind::Deleted,
            key,
            object: None,
        }
    }

    pub fn with_snapshot(kind: UpdateKind, instance: Instance) -> Self {
        Self {
            kind,
            key: instance.key(),
            object: Some(instance),
        }
    }

    /// Returns the snapshot if it is usable: present and matching the key.
    pub fn snapshot(&self) -> Option<&Instance> {
        self.object.as_ref().filter(|instance| {
            instance.metadata.namespace == self.key.namespace()
                && instance.metadata.name == self.key.name()
        })
    }

    /// Returns true if the event must be skipped by consumers.
    pub fn is_malformed(&self) -> bool {
        self.kind != UpdateKind::Deleted && self.snapshot().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labvt_model::GenericRef;

    fn instance(name: &str) -> Instance {
        Instance::new(
            &ObjectKey::new("tenant-tester", name),
            GenericRef::new("kubernetes"),
            GenericRef::new("tester"),
        )
    }

    #[test]
    fn test_update_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&UpdateKind::Modified).unwrap(),
            "\"MODIFIED\""
        );
        assert_eq!(UpdateKind::Deleted.to_string(), "deleted");
    }

    #[test]
    fn test_update_kind_parse() {
        assert_eq!(UpdateKind::parse("ADDED").unwrap(), UpdateKind::Added);
        assert!(matches!(
            UpdateKind::parse("BOOKMARK"),
            Err(crate::EventError::UnknownUpdateKind(k)) if k == "BOOKMARK"
        ));
    }

    #[test]
    fn test_snapshot_must_match_key() {
        let mut event = ChangeEvent::modified(instance("a"));
        assert!(event.snapshot().is_some());
        assert!(!event.is_malformed());

        event.key = ObjectKey::new("tenant-tester", "b");
        assert!(event.snapshot().is_none());
        assert!(event.is_malformed());
    }

    #[test]
    fn test_delete_without_snapshot_is_not_malformed() {
        let event = ChangeEvent::deleted(ObjectKey::new("tenant-tester", "a"));
        assert!(event.snapshot().is_none());
        assert!(!event.is_malformed());
    }
}
