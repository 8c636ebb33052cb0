//! Control plane API client for the instance watch.
//!
//! Provides the two calls a viewer session needs:
//! - Fetching the authoritative instance list (initial load and resync)
//! - Polling the change stream after a cursor

use std::time::Duration;

use anyhow::{Context, Result};
use labvt_events::{EventId, EventsPage, InstanceList};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{debug, error};

use crate::config::Config;

/// Control plane API client.
pub struct ControlPlaneClient {
    client: reqwest::Client,
    base_url: String,
    tenant: String,
    namespace: Option<String>,
}

impl ControlPlaneClient {
    /// Create a new control plane client.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.control_plane_token {
            let raw = token.expose().trim();
            let bearer = if raw.starts_with("Bearer ") || raw.starts_with("bearer ") {
                raw.to_string()
            } else {
                format!("Bearer {raw}")
            };

            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&bearer).context("Invalid control-plane token format")?,
            );
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("labvt-instance-watch/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.control_plane_url.trim_end_matches('/').to_string(),
            tenant: config.tenant.clone(),
            namespace: config.namespace.clone(),
        })
    }

    /// Fetch every instance currently visible to the tenant.
    pub async fn list_instances(&self) -> Result<InstanceList> {
        let url = format!("{}/v1/tenants/{}/instances", self.base_url, self.tenant);
        debug!(url = %url, "Fetching instance list");

        let mut request = self.client.get(&url);
        if let Some(namespace) = &self.namespace {
            request = request.query(&[("namespace", namespace)]);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Failed to fetch instance list");
            anyhow::bail!("Failed to fetch instance list: {} - {}", status, body);
        }

        let list: InstanceList = response.json().await?;
        debug!(
            cursor = %list.cursor,
            instance_count = list.items.len(),
            "Fetched instance list"
        );

        Ok(list)
    }

    /// Fetch change records after `after`.
    pub async fn fetch_events(&self, after: EventId, limit: i64) -> Result<EventsPage> {
        let url = format!(
            "{}/v1/tenants/{}/instances/events",
            self.base_url, self.tenant
        );

        let mut request = self
            .client
            .get(&url)
            .query(&[("after_event_id", after.value()), ("limit", limit)]);
        if let Some(namespace) = &self.namespace {
            request = request.query(&[("namespace", namespace)]);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("events query failed (status={}): {}", status, body);
        }

        Ok(response.json::<EventsPage>().await?)
    }
}
