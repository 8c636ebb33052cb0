//! User-facing notifications for instance changes.

use labvt_events::UpdateKind;
use labvt_model::{Instance, InstancePhase, ObjectKey};
use serde::Serialize;

/// Who is looking at the instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerScope {
    /// Tenant of the current viewer.
    pub tenant: String,
    /// The viewer manages a workspace and also sees other tenants' instances.
    pub manager_view: bool,
}

impl ViewerScope {
    pub fn tenant(tenant: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            manager_view: false,
        }
    }

    pub fn manager(tenant: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            manager_view: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A message addressed to the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub key: ObjectKey,
    pub kind: UpdateKind,
    pub phase: Option<InstancePhase>,
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

/// Builds the notification for an applied change.
///
/// Total over every kind and phase; an absent or unknown phase yields a
/// generic informational message.
pub fn notify(
    phase: Option<InstancePhase>,
    instance: &Instance,
    kind: UpdateKind,
    scope: &ViewerScope,
) -> Notification {
    let owner = &instance.spec.tenant.name;
    let subject = if owner == &scope.tenant {
        format!("Your instance {}", instance.metadata.name)
    } else if scope.manager_view {
        format!("Instance {} of {}", instance.metadata.name, owner)
    } else {
        format!("Instance {}", instance.metadata.name)
    };

    let (severity, title, detail) = match (kind, phase) {
        (UpdateKind::Deleted, _) => (Severity::Info, "Instance deleted", "has been deleted"),
        (UpdateKind::Added, Some(p)) if p.is_failure() => {
            (Severity::Error, "Instance failed", "could not be created")
        }
        (UpdateKind::Added, _) => (Severity::Info, "Instance created", "has been created"),
        (UpdateKind::Modified, Some(phase)) => match phase {
            InstancePhase::Ready => (Severity::Success, "Instance ready", "is ready"),
            InstancePhase::Running => (Severity::Success, "Instance running", "is running"),
            InstancePhase::Pending => (Severity::Info, "Instance pending", "is pending"),
            InstancePhase::Importing => {
                (Severity::Info, "Instance importing", "is importing its image")
            }
            InstancePhase::Starting => (Severity::Info, "Instance starting", "is starting"),
            InstancePhase::Stopping => (Severity::Info, "Instance stopping", "is stopping"),
            InstancePhase::Off => (Severity::Info, "Instance stopped", "has been stopped"),
            InstancePhase::Failed | InstancePhase::CreationLoopBackoff => {
                (Severity::Error, "Instance failed", "failed to start")
            }
            InstancePhase::ResourceQuotaExceeded => (
                Severity::Warning,
                "Quota exceeded",
                "cannot start: resource quota exceeded",
            ),
            InstancePhase::Unknown => (Severity::Info, "Instance updated", "has been updated"),
        },
        (UpdateKind::Modified, None) => (Severity::Info, "Instance updated", "has been updated"),
    };

    Notification {
        key: instance.key(),
        kind,
        phase,
        severity,
        title: title.to_string(),
        message: format!("{subject} {detail}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labvt_model::GenericRef;
    use rstest::rstest;

    fn instance(tenant: &str) -> Instance {
        Instance::new(
            &ObjectKey::new("tenant-tester", "kubernetes-0000"),
            GenericRef::new("kubernetes"),
            GenericRef::new(tenant),
        )
    }

    #[rstest]
    #[case(UpdateKind::Modified, Some(InstancePhase::Ready), Severity::Success, "is ready")]
    #[case(UpdateKind::Modified, Some(InstancePhase::Off), Severity::Info, "has been stopped")]
    #[case(UpdateKind::Modified, Some(InstancePhase::Failed), Severity::Error, "failed to start")]
    #[case(
        UpdateKind::Modified,
        Some(InstancePhase::ResourceQuotaExceeded),
        Severity::Warning,
        "resource quota exceeded"
    )]
    #[case(UpdateKind::Modified, Some(InstancePhase::Unknown), Severity::Info, "has been updated")]
    #[case(UpdateKind::Modified, None, Severity::Info, "has been updated")]
    #[case(UpdateKind::Added, Some(InstancePhase::Pending), Severity::Info, "has been created")]
    #[case(UpdateKind::Added, None, Severity::Info, "has been created")]
    #[case(UpdateKind::Added, Some(InstancePhase::CreationLoopBackoff), Severity::Error, "could not be created")]
    #[case(UpdateKind::Deleted, Some(InstancePhase::Ready), Severity::Info, "has been deleted")]
    #[case(UpdateKind::Deleted, None, Severity::Info, "has been deleted")]
    fn test_notify_messages(
        #[case] kind: UpdateKind,
        #[case] phase: Option<InstancePhase>,
        #[case] severity: Severity,
        #[case] fragment: &str,
    ) {
        let n = notify(phase, &instance("tester"), kind, &ViewerScope::tenant("tester"));
        assert_eq!(n.severity, severity);
        assert_eq!(n.kind, kind);
        assert_eq!(n.phase, phase);
        assert!(n.message.contains(fragment), "{}", n.message);
        assert!(n.message.starts_with("Your instance kubernetes-0000"));
    }

    #[test]
    fn test_notify_subject_follows_scope() {
        let inst = instance("someone-else");
        let n = notify(None, &inst, UpdateKind::Added, &ViewerScope::manager("tester"));
        assert_eq!(n.message, "Instance kubernetes-0000 of someone-else has been created");

        let n = notify(None, &inst, UpdateKind::Added, &ViewerScope::tenant("tester"));
        assert_eq!(n.message, "Instance kubernetes-0000 has been created");
    }
}
