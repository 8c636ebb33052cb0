//! labvt instance watch
//!
//! Keeps a live, ordered view of a tenant's instances and reports every
//! relevant change as a notification.
//!
//! This service:
//! - Loads the authoritative instance list from the control plane
//! - Follows the change stream after the list's cursor
//! - Resyncs from scratch whenever the stream is lost

use anyhow::Result;
use labvt_instance_watch::pump::{run_watch_loop, BackoffPolicy};
use labvt_instance_watch::{report, Config, ControlPlaneClient};
use labvt_sync::spawn_session;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to LABVT_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting labvt instance watch");
    info!(
        control_plane_url = %config.control_plane_url,
        tenant = %config.tenant,
        namespace = ?config.namespace,
        manager_view = config.manager_view,
        once = config.once,
        "Configuration loaded"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (notify_tx, notify_rx) = mpsc::channel(256);
    let (session, session_task) = spawn_session(config.scope(), 256, notify_tx, shutdown_rx);

    let notifications_task = tokio::spawn(report::log_notifications(notify_rx));
    let view_task = tokio::spawn(report::log_view(session.view()));

    let client = ControlPlaneClient::new(&config)?;
    let backoff = BackoffPolicy::default();

    tokio::select! {
        result = run_watch_loop(&config, &client, &session, &backoff) => {
            if let Err(e) = result {
                error!(error = %e, "Watch loop failed");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            let _ = shutdown_tx.send(true);
        }
    }

    // Without a shutdown signal the session drains its mailbox before stopping.
    drop(session);

    let stats = session_task.await?;
    let delivered = notifications_task.await?;
    view_task.abort();

    info!(
        messages_processed = stats.messages_processed,
        events_applied = stats.events_applied,
        events_dropped = stats.events_dropped,
        events_malformed = stats.events_malformed,
        resyncs = stats.resyncs,
        notifications = delivered,
        "Instance watch stopped"
    );

    Ok(())
}
