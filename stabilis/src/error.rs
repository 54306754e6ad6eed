//! Error types for registration operations.

use thiserror::Error;

/// Errors surfaced by the registration engine.
///
/// Numerical degeneracies (flat correlation peaks, samples falling outside the
/// image) are never reported here; they resolve to a defined default instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed input: bad channel index, mismatched buffer lengths,
    /// empty dimensions.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Inputs are well-formed but cannot be reconciled, e.g. images with
    /// different bounds and no translation hint to explain the difference.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_message() {
        let err = Error::InvalidArgument("channel 3 out of range".to_string());
        assert_eq!(err.to_string(), "Invalid argument: channel 3 out of range");
    }

    #[test]
    fn test_unsupported_operation_message() {
        let err = Error::UnsupportedOperation("bounds differ".to_string());
        assert_eq!(err.to_string(), "Unsupported operation: bounds differ");
    }
}
