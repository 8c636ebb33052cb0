//! Instance state synchronization for live views.
//!
//! Keeps a duplicate-free, ordered replica of the instances a viewer can see,
//! fed by an at-least-once change stream:
//!
//! - [`replica`]: pure merge of change events into the ordered collection
//! - [`notifier`]: stateless translation of an applied change into a message
//! - [`session`]: single-consumer task tying both together for one viewer
//!
//! # Invariants
//!
//! - At most one record per identity
//! - Records untouched by an event keep their relative order
//! - Replaying an event leaves the collection unchanged
//! - After a disconnect, nothing is applied until a full resync

pub mod notifier;
pub mod replica;
pub mod session;

pub use notifier::{notify, Notification, Severity, ViewerScope};
pub use replica::{ApplyOutcome, InstanceRecord, InstanceReplica};
pub use session::{
    spawn_session, SessionError, SessionHandle, SessionMessage, SessionStats, SessionView,
    SyncState, ViewerSession,
};
