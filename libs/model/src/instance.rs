//! Instance and template definitions.

use serde::{Deserialize, Serialize};

use crate::{Labels, ObjectKey};

// =============================================================================
// Metadata
// =============================================================================

/// Reference to another object by name (and optionally namespace).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl GenericRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    pub fn namespaced(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }
}

/// Object metadata relevant to labelling and identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    /// Absent and empty label sets are distinct on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
}

impl ObjectMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels: None,
        }
    }

    /// Returns the identity of the object.
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.namespace.clone(), self.name.clone())
    }
}

// =============================================================================
// Template
// =============================================================================

/// A single runnable unit of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub name: String,
    /// Whether the environment survives restarts.
    #[serde(default)]
    pub persistent: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub workspace_ref: GenericRef,
    #[serde(default)]
    pub environment_list: Vec<Environment>,
}

/// Describes the environments an instance is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub metadata: ObjectMeta,
    pub spec: TemplateSpec,
}

impl Template {
    /// Returns true if at least one environment is persistent.
    pub fn is_persistent(&self) -> bool {
        self.spec.environment_list.iter().any(|env| env.persistent)
    }
}

// =============================================================================
// Instance
// =============================================================================

/// Optional customization endpoints of an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceCustomizationUrls {
    /// Where the initial content is pulled from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_origin: Option<String>,
    /// Where the content is submitted on termination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_destination: Option<String>,
    /// Endpoint polled to decide whether the instance can be terminated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_check: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub template: GenericRef,
    pub tenant: GenericRef,
    #[serde(default = "default_running")]
    pub running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customization_urls: Option<InstanceCustomizationUrls>,
}

fn default_running() -> bool {
    true
}

/// Lifecycle phase of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstancePhase {
    Pending,
    Importing,
    Starting,
    Running,
    Ready,
    Stopping,
    Off,
    Failed,
    CreationLoopBackoff,
    ResourceQuotaExceeded,
    /// Any value this build does not recognise.
    #[serde(other)]
    Unknown,
}

impl InstancePhase {
    /// Returns true if the phase represents a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Failed | Self::CreationLoopBackoff | Self::ResourceQuotaExceeded
        )
    }
}

impl std::fmt::Display for InstancePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InstancePhase::Pending => "pending",
            InstancePhase::Importing => "importing",
            InstancePhase::Starting => "starting",
            InstancePhase::Running => "running",
            InstancePhase::Ready => "ready",
            InstancePhase::Stopping => "stopping",
            InstancePhase::Off => "off",
            InstancePhase::Failed => "failed",
            InstancePhase::CreationLoopBackoff => "creation_loop_backoff",
            InstancePhase::ResourceQuotaExceeded => "resource_quota_exceeded",
            InstancePhase::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Status of a single environment of a running instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentStatus {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<InstancePhase>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<InstancePhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<EnvironmentStatus>,
}

/// A provisioned lab environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub metadata: ObjectMeta,
    pub spec: InstanceSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InstanceStatus>,
}

impl Instance {
    /// Creates an instance with no status.
    pub fn new(key: &ObjectKey, template: GenericRef, tenant: GenericRef) -> Self {
        Self {
            metadata: ObjectMeta::new(key.namespace(), key.name()),
            spec: InstanceSpec {
                template,
                tenant,
                running: true,
                customization_urls: None,
            },
            status: None,
        }
    }

    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    /// Returns the current phase, if the controller has reported one.
    pub fn phase(&self) -> Option<InstancePhase> {
        self.status.as_ref().and_then(|s| s.phase)
    }

    /// Returns a copy with the given phase set.
    #[must_use]
    pub fn with_phase(mut self, phase: InstancePhase) -> Self {
        self.status.get_or_insert_with(InstanceStatus::default).phase = Some(phase);
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
