//! Error types for TinyKV.
//!
//! Every store operation reports its outcome through a `Result`. A missing key
//! is not an error: read operations return `Ok(None)` for it.

use crate::storage::ValueKind;
use thiserror::Error;

/// Result type alias using [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while operating on the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key is live but holds a value of a different shape.
    #[error("WRONGTYPE key '{key}' holds a {actual}, not a {expected}")]
    WrongType {
        key: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// An expiry was requested for a key that has no live entry.
    #[error("cannot set expiry on '{0}': no such key")]
    InvalidTarget(String),

    /// The background expirer thread could not be spawned.
    #[error("failed to spawn expirer thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for the type-mismatch condition.
    pub fn is_wrong_type(&self) -> bool {
        matches!(self, StoreError::WrongType { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_type_message() {
        let err = StoreError::WrongType {
            key: "k".to_string(),
            expected: ValueKind::Hash,
            actual: ValueKind::String,
        };
        assert!(err.is_wrong_type());
        assert_eq!(err.to_string(), "WRONGTYPE key 'k' holds a string, not a hash");
    }

    #[test]
    fn test_invalid_target_message() {
        let err = StoreError::InvalidTarget("gone".to_string());
        assert!(!err.is_wrong_type());
        assert_eq!(err.to_string(), "cannot set expiry on 'gone': no such key");
    }
}
