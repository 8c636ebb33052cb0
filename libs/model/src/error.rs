//! Error types for object key parsing.

use thiserror::Error;

/// Errors that can occur when parsing an object key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The key string is empty.
    #[error("object key cannot be empty")]
    Empty,

    /// The key is missing the `/` separator.
    #[error("object key missing '/' separator: '{0}'")]
    MissingSeparator(String),

    /// One of the two segments is empty.
    #[error("object key has an empty {segment}: '{actual}'")]
    EmptySegment {
        segment: &'static str,
        actual: String,
    },

    /// The name segment contains another `/`.
    #[error("object key has more than one '/' separator: '{0}'")]
    ExtraSeparator(String),
}

impl KeyError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, KeyError::Empty)
    }
}
