//! Instance watch configuration.
//!
//! Everything is env-driven; see `Config::from_env` for the variables.

use std::time::Duration;

use anyhow::{Context, Result};
use labvt_sync::ViewerScope;

/// Bearer token for the control plane. Never printed.
#[derive(Clone)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

/// Instance watch configuration (env-driven).
#[derive(Debug, Clone)]
pub struct Config {
    /// Control plane base URL (example: http://localhost:8080).
    pub control_plane_url: String,

    /// Optional bearer token for the control plane.
    pub control_plane_token: Option<ApiToken>,

    /// Tenant whose instances are watched.
    pub tenant: String,

    /// Restrict the view to a single namespace.
    pub namespace: Option<String>,

    /// The viewer manages a workspace and sees other tenants' instances.
    pub manager_view: bool,

    /// Max events to fetch per poll.
    pub fetch_limit: i64,

    /// Poll interval when no new events are available.
    pub poll_interval: Duration,

    /// Exit once fully caught up.
    pub once: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let control_plane_url = var("LABVT_CONTROL_PLANE_URL")
            .unwrap_or_else(|| "http://localhost:8080".to_string());

        let control_plane_token = var("LABVT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .map(ApiToken::new);

        let tenant = var("LABVT_TENANT")
            .filter(|t| !t.is_empty())
            .context("Missing tenant. Set LABVT_TENANT.")?;

        let namespace = var("LABVT_NAMESPACE").filter(|ns| !ns.is_empty());

        let manager_view = var("LABVT_MANAGER_VIEW")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let fetch_limit: i64 = var("LABVT_SYNC_LIMIT")
            .map(|v| v.parse())
            .transpose()
            .context("LABVT_SYNC_LIMIT must be an integer.")?
            .unwrap_or(200)
            .clamp(1, 500);

        let poll_interval_ms: u64 = var("LABVT_SYNC_POLL_INTERVAL_MS")
            .map(|v| v.parse())
            .transpose()
            .context("LABVT_SYNC_POLL_INTERVAL_MS must be an integer (milliseconds).")?
            .unwrap_or(1000);
        let poll_interval = Duration::from_millis(poll_interval_ms.max(50));

        let once = var("LABVT_SYNC_ONCE")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let log_level = var("LABVT_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            control_plane_url,
            control_plane_token,
            tenant,
            namespace,
            manager_view,
            fetch_limit,
            poll_interval,
            once,
            log_level,
        })
    }

    /// Scope used to address notifications.
    pub fn scope(&self) -> ViewerScope {
        ViewerScope {
            tenant: self.tenant.clone(),
            manager_view: self.manager_view,
        }
    }
}
