//! Log-based consumers of a viewer session's output.

use labvt_sync::{Notification, SessionView, Severity};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

/// Log every notification until the session stops.
pub async fn log_notifications(mut rx: mpsc::Receiver<Notification>) -> u64 {
    let mut count = 0;
    while let Some(n) = rx.recv().await {
        count += 1;
        match n.severity {
            Severity::Error => error!(instance = %n.key, kind = %n.kind, title = %n.title, "{}", n.message),
            Severity::Warning => warn!(instance = %n.key, kind = %n.kind, title = %n.title, "{}", n.message),
            Severity::Info | Severity::Success => {
                info!(instance = %n.key, kind = %n.kind, title = %n.title, "{}", n.message)
            }
        }
    }
    count
}

/// Log a summary of the view every time it changes.
pub async fn log_view(mut view: watch::Receiver<SessionView>) {
    while view.changed().await.is_ok() {
        let current = view.borrow_and_update().clone();
        let phases: Vec<String> = current
            .records
            .iter()
            .map(|r| match r.instance.phase() {
                Some(phase) => format!("{}={}", r.key, phase),
                None => r.key.to_string(),
            })
            .collect();

        info!(
            degraded = current.state.is_degraded(),
            instance_count = current.records.len(),
            instances = ?phases,
            "view updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labvt_events::UpdateKind;
    use labvt_model::ObjectKey;

    #[tokio::test]
    async fn test_log_notifications_counts_until_closed() {
        let (tx, rx) = mpsc::channel(4);
        for severity in [Severity::Info, Severity::Error] {
            tx.send(Notification {
                key: ObjectKey::new("tenant-tester", "a"),
                kind: UpdateKind::Modified,
                phase: None,
                severity,
                title: "Instance updated".to_string(),
                message: "Your instance a has been updated".to_string(),
            })
            .await
            .unwrap();
        }
        drop(tx);
        assert_eq!(log_notifications(rx).await, 2);
    }
}
