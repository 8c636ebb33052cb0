//! # labvt-model
//!
//! Object types shared by the label forge and the instance synchronizer.
//!
//! ## Design Principles
//!
//! - Objects are identified by `namespace/name`, never by display names
//! - Optional configuration is modelled with `Option`, not sentinel values
//! - Unknown status values received from the wire decode to an explicit
//!   `Unknown` variant instead of failing
//!
//! ## Identity Format
//!
//! All object keys use the canonical form `{namespace}/{name}`:
//! - `tenant-tester/kubernetes-0000`
//! - `workspace-netgroup/kubernetes`

mod error;
mod instance;
mod key;

pub use error::KeyError;
pub use instance::*;
pub use key::ObjectKey;

/// Label set attached to an object.
pub type Labels = std::collections::BTreeMap<String, String>;
