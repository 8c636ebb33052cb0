//! Error types for event decoding.

use labvt_model::KeyError;
use thiserror::Error;

/// Errors that can occur when decoding events.
#[derive(Debug, Error, Clone)]
pub enum EventError {
    /// The update kind is unknown.
    #[error("unknown update kind: {0}")]
    UnknownUpdateKind(String),

    /// The record does not identify a valid object.
    #[error("invalid object key: {0}")]
    InvalidKey(#[from] KeyError),
}
