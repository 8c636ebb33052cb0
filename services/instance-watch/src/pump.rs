//! Transport pump - feeds a viewer session from the control plane.
//!
//! The pump alternates between two phases:
//! - Resync: fetch the authoritative list and hand it to the session
//! - Stream: poll change records after the list's cursor and forward them
//!
//! Any transport failure while streaming marks the session disconnected and
//! sends the pump back to resync after a backoff delay.

use std::time::Duration;

use anyhow::Result;
use labvt_events::EventId;
use labvt_sync::SessionHandle;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::client::ControlPlaneClient;
use crate::config::Config;

// =============================================================================
// Backoff
// =============================================================================

/// Exponential backoff configuration.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Base delay for first retry.
    pub base: Duration,

    /// Maximum delay.
    pub max: Duration,

    /// Jitter factor (0.0 to 1.0).
    pub jitter: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(250),
            max: Duration::from_secs(30),
            jitter: 0.25,
        }
    }
}

impl BackoffPolicy {
    /// Calculate delay for the given attempt number.
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = self.base.as_millis() as f64 * 2.0_f64.powi(attempt.min(30) as i32);
        let delay = delay.min(self.max.as_millis() as f64);

        let jitter_range = delay * self.jitter.clamp(0.0, 1.0);
        let jitter = if jitter_range > 0.0 {
            rand::rng().random_range(-jitter_range..=jitter_range)
        } else {
            0.0
        };

        Duration::from_millis((delay + jitter).max(0.0) as u64)
    }
}

// =============================================================================
// Pump
// =============================================================================

enum StreamEnd {
    /// Caught up in one-shot mode.
    CaughtUp,
    /// The transport failed; a resync is required.
    Lost(String),
}

/// Keep `session` in sync with the control plane.
///
/// Returns when the session stops, or once caught up if `config.once` is set.
pub async fn run_watch_loop(
    config: &Config,
    client: &ControlPlaneClient,
    session: &SessionHandle,
    backoff: &BackoffPolicy,
) -> Result<()> {
    let mut failures: u32 = 0;

    loop {
        let list = match client.list_instances().await {
            Ok(list) => list,
            Err(e) => {
                let delay = backoff.delay(failures);
                failures = failures.saturating_add(1);
                warn!(
                    error = %e,
                    attempt = failures,
                    delay_ms = delay.as_millis(),
                    "failed to fetch instance list; retrying"
                );
                tokio::time::sleep(delay).await;
                continue;
            }
        };

        let cursor = list.cursor;
        info!(
            tenant = %config.tenant,
            cursor = %cursor,
            instance_count = list.items.len(),
            "resynchronizing session"
        );
        session.resync(list.items).await?;
        failures = 0;

        match stream_events(config, client, session, cursor).await? {
            StreamEnd::CaughtUp => {
                info!(tenant = %config.tenant, "sync complete");
                return Ok(());
            }
            StreamEnd::Lost(reason) => {
                session.disconnected(reason.clone()).await?;
                let delay = backoff.delay(failures);
                failures = failures.saturating_add(1);
                warn!(
                    reason = %reason,
                    delay_ms = delay.as_millis(),
                    "change stream lost; resyncing"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn stream_events(
    config: &Config,
    client: &ControlPlaneClient,
    session: &SessionHandle,
    mut cursor: EventId,
) -> Result<StreamEnd> {
    loop {
        let page = match client.fetch_events(cursor, config.fetch_limit).await {
            Ok(page) => page,
            Err(e) => return Ok(StreamEnd::Lost(e.to_string())),
        };

        if page.items.is_empty() {
            if config.once {
                return Ok(StreamEnd::CaughtUp);
            }

            tokio::time::sleep(config.poll_interval).await;
            continue;
        }

        for record in page.items {
            cursor = cursor.max(record.event_id);

            let event = match record.decode() {
                Ok(event) => event,
                Err(e) => {
                    warn!(
                        event_id = %record.event_id,
                        error = %e,
                        "skipping undecodable change record"
                    );
                    continue;
                }
            };

            if record.has_object() && event.object.is_none() {
                warn!(
                    event_id = %record.event_id,
                    instance = %event.key,
                    "change record carries an invalid snapshot"
                );
            }

            debug!(
                event_id = %record.event_id,
                instance = %event.key,
                kind = %event.kind,
                "forwarding change"
            );
            session.event(event).await?;
        }

        cursor = cursor.max(page.next_after_event_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labvt_model::InstancePhase;
    use labvt_sync::{spawn_session, SyncState, ViewerScope};
    use tokio::sync::{mpsc, watch};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn object(name: &str, phase: &str) -> serde_json::Value {
        serde_json::json!({
            "metadata": {"name": name, "namespace": "tenant-tester"},
            "spec": {"template": {"name": "kubernetes"}, "tenant": {"name": "tester"}},
            "status": {"phase": phase}
        })
    }

    fn config(url: &str) -> Config {
        Config::from_lookup(|key| match key {
            "LABVT_CONTROL_PLANE_URL" => Some(url.to_string()),
            "LABVT_TENANT" => Some("tester".to_string()),
            "LABVT_SYNC_ONCE" => Some("true".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_backoff_policy() {
        let policy = BackoffPolicy {
            base: Duration::from_millis(100),
            max: Duration::from_secs(5),
            jitter: 0.0,
        };

        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(20), Duration::from_secs(5));
    }

    #[test]
    fn test_backoff_jitter_bounds() {
        let policy = BackoffPolicy::default();
        for _ in 0..32 {
            let d = policy.delay(2);
            assert!(d >= Duration::from_millis(750) && d <= Duration::from_millis(1250));
        }
    }

    #[tokio::test]
    async fn test_watch_loop_applies_stream_after_resync() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/tenants/tester/instances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [object("a", "pending")],
                "cursor": 5
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tenants/tester/instances/events"))
            .and(query_param("after_event_id", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"event_id": 6, "type": "MODIFIED", "namespace": "tenant-tester", "name": "a", "object": object("a", "running")},
                    {"event_id": 7, "type": "ADDED", "namespace": "tenant-tester", "name": "b", "object": object("b", "pending")},
                    {"event_id": 8, "type": "MODIFIED", "namespace": "tenant-tester", "name": "c", "object": {"bogus": true}},
                    {"event_id": 9, "type": "BOOKMARK", "namespace": "tenant-tester", "name": "a"},
                    {"event_id": 10, "type": "DELETED", "namespace": "tenant-tester", "name": "a"}
                ],
                "next_after_event_id": 10
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/tenants/tester/instances/events"))
            .and(query_param("after_event_id", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [],
                "next_after_event_id": 10
            })))
            .mount(&server)
            .await;

        let config = config(&server.uri());
        let client = ControlPlaneClient::new(&config).unwrap();
        let (notify_tx, mut notify_rx) = mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, task) = spawn_session(ViewerScope::tenant("tester"), 16, notify_tx, shutdown_rx);

        run_watch_loop(&config, &client, &handle, &BackoffPolicy::default())
            .await
            .unwrap();

        let view = handle.view();
        drop(handle);
        let stats = task.await.unwrap();

        let mut kinds = Vec::new();
        while let Some(n) = notify_rx.recv().await {
            kinds.push((n.key.name().to_string(), n.phase));
        }
        assert_eq!(
            kinds,
            vec![
                ("a".to_string(), Some(InstancePhase::Running)),
                ("b".to_string(), Some(InstancePhase::Pending)),
            ]
        );
        assert_eq!(stats.events_malformed, 1);
        assert_eq!(stats.resyncs, 1);

        let view = view.borrow().clone();
        assert_eq!(view.state, SyncState::Live);
        let names: Vec<_> = view.records.iter().map(|r| r.key.name().to_string()).collect();
        assert_eq!(names, vec!["b".to_string()]);
    }
}
