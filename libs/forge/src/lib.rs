//! Label forging for instance objects.
//!
//! The reconciliation loop calls into this library every time it observes an
//! instance, and persists the result only when something changed. Key concepts:
//!
//! - **Instance labels**: stamped on the instance itself (workspace, template,
//!   persistence, automation).
//! - **Object labels**: stamped on every object owned by an instance.
//! - **Selector labels**: the subset of object labels used to find those
//!   objects again.
//!
//! # Invariants
//!
//! - Forging is deterministic and idempotent: feeding the output back in
//!   reports no change
//! - Input label sets are never mutated; a new set is always returned
//! - User labels outside the reserved keys are preserved untouched

pub mod automation;
pub mod keys;
mod labels;

pub use automation::automation_enabled;
pub use labels::*;
pub use labvt_model::Labels;
