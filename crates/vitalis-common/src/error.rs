//! Vitalis Error - Unified Error Types
//!
//! Error handling for all Vitalis operations. Every failure the core can
//! produce is a precondition violation raised at the offending call; the
//! remaining variants cover configuration loading and the CLI boundary.
//!
//! Key Features:
//! - Channel selection and aggregation precondition variants
//! - Validation vs user error classification
//! - Seamless integration with std::io::Error
//!
//! @version 0.1.0
//! @author Vitalis Development Team

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Unified error type for all Vitalis operations.
#[derive(Error, Debug)]
pub enum VitalisError {
    // Data model errors
    #[error("invalid channel selection: {0}")]
    InvalidChannelSelection(String),

    #[error("unsupported aggregation: {0}")]
    UnsupportedAggregation(String),

    #[error("missing channel: {0}")]
    MissingChannel(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Serialization errors
    #[error("serialization error: {0}")]
    Serialization(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Type Aliases
// =============================================================================

/// Result type alias for Vitalis operations.
pub type Result<T> = std::result::Result<T, VitalisError>;

// =============================================================================
// Error Classification
// =============================================================================

impl VitalisError {
    /// Returns true if the operation can be safely retried.
    ///
    /// The transforms perform no I/O, so only file access can succeed on a
    /// second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VitalisError::Io(_))
    }

    /// Returns true if this is a user error (vs system error).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            VitalisError::InvalidChannelSelection(_)
                | VitalisError::UnsupportedAggregation(_)
                | VitalisError::MissingChannel(_)
                | VitalisError::Configuration(_)
                | VitalisError::Serialization(_)
        )
    }

    /// Returns true if a data set or aggregation precondition was violated.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            VitalisError::InvalidChannelSelection(_)
                | VitalisError::UnsupportedAggregation(_)
                | VitalisError::MissingChannel(_)
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = VitalisError::MissingChannel("systolic".to_string());
        assert!(err.is_validation_error());
        assert!(err.is_user_error());
        assert!(!err.is_retryable());

        let err = VitalisError::Configuration("bad unit".to_string());
        assert!(!err.is_validation_error());
        assert!(err.is_user_error());

        let err = VitalisError::Serialization("expected value at line 1".to_string());
        assert!(!err.is_validation_error());
        assert!(err.is_user_error());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: VitalisError = io.into();
        assert!(err.is_retryable());
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_error_display() {
        let err = VitalisError::UnsupportedAggregation("min_max on multi-channel".to_string());
        assert_eq!(
            err.to_string(),
            "unsupported aggregation: min_max on multi-channel"
        );
    }
}
