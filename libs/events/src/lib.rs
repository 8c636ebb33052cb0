//! # labvt-events
//!
//! Change events describing how the set of visible instances evolves.
//!
//! ## Design Principles
//!
//! - Events carry the full instance snapshot, never a partial patch
//! - Delivery is at-least-once: consumers must tolerate duplicates
//! - Ordering is only guaranteed per instance identity
//! - A snapshot that cannot be decoded makes the event malformed, not invalid:
//!   consumers skip it and keep reading the stream
//!
//! ## Wire Format
//!
//! Watch records are JSON objects:
//!
//! ```json
//! {"event_id": 42, "type": "MODIFIED", "namespace": "tenant-tester",
//!  "name": "kubernetes-0000", "object": { ... }}
//! ```

mod error;
mod record;
mod types;

pub use error::EventError;
pub use record::*;
pub use types::*;
