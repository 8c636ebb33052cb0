//! Viewer session - single consumer of a change stream.
//!
//! A session owns one replica and applies messages strictly one at a time:
//! - `Resync` replaces the replica with an authoritative list and goes live
//! - `Event` applies a change and emits at most one notification
//! - `Disconnected` marks the stream as degraded; events are dropped until the
//!   next `Resync`, since the transport offers no resume point
//!
//! Sessions share nothing with each other.

use labvt_events::ChangeEvent;
use labvt_model::Instance;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::notifier::{notify, Notification, ViewerScope};
use crate::replica::{ApplyOutcome, InstanceRecord, InstanceReplica};

// =============================================================================
// Messages
// =============================================================================

/// Messages handled by a viewer session.
#[derive(Debug)]
pub enum SessionMessage {
    /// Authoritative list fetched from the control plane.
    Resync { items: Vec<Instance> },

    /// Incremental change from the stream.
    Event(ChangeEvent),

    /// The transport lost the stream.
    Disconnected { reason: String },
}

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Waiting for an authoritative list; the view may be stale.
    AwaitingResync,
    /// Applying incremental events.
    Live,
}

impl SyncState {
    /// Returns true if the display should show a degraded indicator.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::AwaitingResync)
    }
}

/// What the display layer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub state: SyncState,
    pub records: Vec<InstanceRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub messages_processed: u64,
    pub events_applied: u64,
    pub events_dropped: u64,
    pub events_malformed: u64,
    pub resyncs: u64,
    pub notifications: u64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// The session task has stopped.
    #[error("session stopped")]
    Stopped,
}

// =============================================================================
// Viewer Session
// =============================================================================

/// Session state machine, independent of the task that drives it.
#[derive(Debug)]
pub struct ViewerSession {
    scope: ViewerScope,
    replica: InstanceReplica,
    state: SyncState,
    stats: SessionStats,
}

impl ViewerSession {
    pub fn new(scope: ViewerScope) -> Self {
        Self {
            scope,
            replica: InstanceReplica::new(),
            state: SyncState::AwaitingResync,
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn replica(&self) -> &InstanceReplica {
        &self.replica
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.state,
            records: self.replica.records().to_vec(),
        }
    }

    /// Handles one message, returning the notification it produced.
    pub fn handle(&mut self, msg: SessionMessage) -> Option<Notification> {
        self.stats.messages_processed += 1;

        let notification = match msg {
            SessionMessage::Resync { items } => {
                self.handle_resync(items);
                None
            }
            SessionMessage::Event(event) => self.handle_event(&event),
            SessionMessage::Disconnected { reason } => {
                self.handle_disconnected(&reason);
                None
            }
        };

        if notification.is_some() {
            self.stats.notifications += 1;
        }
        notification
    }

    fn handle_resync(&mut self, items: Vec<Instance>) {
        self.replica.reset(items);
        self.state = SyncState::Live;
        self.stats.resyncs += 1;

        info!(
            tenant = %self.scope.tenant,
            instance_count = self.replica.len(),
            "replica resynchronized"
        );
    }

    /// Applies an incremental change.
    ///
    /// Every added or modified event with a usable snapshot yields a
    /// notification, including replays that leave the replica unchanged
    /// (`ApplyOutcome::Replaced { changed: false }`): the notifier runs once
    /// per delivered event.
    fn handle_event(&mut self, event: &ChangeEvent) -> Option<Notification> {
        if self.state != SyncState::Live {
            self.stats.events_dropped += 1;
            debug!(
                instance = %event.key,
                kind = %event.kind,
                "dropping change event while awaiting resync"
            );
            return None;
        }

        let outcome = self.replica.apply(event);
        match outcome {
            ApplyOutcome::Skipped => {
                self.stats.events_malformed += 1;
                warn!(
                    instance = %event.key,
                    kind = %event.kind,
                    "skipping change event without usable snapshot"
                );
                return None;
            }
            ApplyOutcome::Absent => {
                debug!(instance = %event.key, "delete for unknown instance");
                return None;
            }
            _ => {
                self.stats.events_applied += 1;
                debug!(
                    instance = %event.key,
                    kind = %event.kind,
                    outcome = ?outcome,
                    "change event applied"
                );
            }
        }

        let snapshot = event.snapshot()?;
        Some(notify(snapshot.phase(), snapshot, event.kind, &self.scope))
    }

    fn handle_disconnected(&mut self, reason: &str) {
        if self.state == SyncState::Live {
            warn!(
                tenant = %self.scope.tenant,
                reason = %reason,
                "change stream lost, awaiting resync"
            );
        }
        self.state = SyncState::AwaitingResync;
    }
}

// =============================================================================
// Session Task
// =============================================================================

/// Handle for feeding a running session.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionMessage>,
    view: watch::Receiver<SessionView>,
}

impl SessionHandle {
    pub async fn send(&self, msg: SessionMessage) -> Result<(), SessionError> {
        self.tx.send(msg).await.map_err(|_| SessionError::Stopped)
    }

    pub async fn resync(&self, items: Vec<Instance>) -> Result<(), SessionError> {
        self.send(SessionMessage::Resync { items }).await
    }

    pub async fn event(&self, event: ChangeEvent) -> Result<(), SessionError> {
        self.send(SessionMessage::Event(event)).await
    }

    pub async fn disconnected(&self, reason: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionMessage::Disconnected {
            reason: reason.into(),
        })
        .await
    }

    /// Subscribe to the published view.
    pub fn view(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    pub fn state(&self) -> SyncState {
        self.view.borrow().state
    }
}

/// Spawn a session task.
///
/// The task stops when every handle is dropped or `shutdown` flips to true,
/// and returns its final statistics.
pub fn spawn_session(
    scope: ViewerScope,
    mailbox_size: usize,
    notifications: mpsc::Sender<Notification>,
    shutdown: watch::Receiver<bool>,
) -> (SessionHandle, tokio::task::JoinHandle<SessionStats>) {
    let session = ViewerSession::new(scope);
    let (tx, rx) = mpsc::channel(mailbox_size.max(1));
    let (view_tx, view_rx) = watch::channel(session.view());

    let task = tokio::spawn(run_session_loop(session, rx, view_tx, notifications, shutdown));

    (SessionHandle { tx, view: view_rx }, task)
}

async fn run_session_loop(
    mut session: ViewerSession,
    mut rx: mpsc::Receiver<SessionMessage>,
    view_tx: watch::Sender<SessionView>,
    notifications: mpsc::Sender<Notification>,
    mut shutdown: watch::Receiver<bool>,
) -> SessionStats {
    debug!(tenant = %session.scope.tenant, "session started");

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!(tenant = %session.scope.tenant, "session received shutdown signal");
                    break;
                }
            }

            msg = rx.recv() => {
                let Some(msg) = msg else {
                    debug!(tenant = %session.scope.tenant, "session mailbox closed");
                    break;
                };

                let notification = session.handle(msg);

                let next = session.view();
                view_tx.send_if_modified(|current| {
                    if *current == next {
                        return false;
                    }
                    *current = next;
                    true
                });

                if let Some(notification) = notification {
                    if notifications.send(notification).await.is_err() {
                        debug!("notification receiver dropped");
                    }
                }
            }
        }
    }

    let stats = session.stats();
    info!(
        tenant = %session.scope.tenant,
        messages_processed = stats.messages_processed,
        notifications = stats.notifications,
        "session stopped"
    );
    stats
}

// =============================================================================
// Tests
// =============================================================================
