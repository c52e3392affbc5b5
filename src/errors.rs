//! Error handling for the ballot registry

use crate::types::CandidateId;

/// Result type alias for the ballot registry
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the ballot registry
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Caller is not the recorded owner
    #[error("Invalid owner")]
    Unauthorized,

    /// Candidate id outside `[1, candidates_count]`
    #[error("Invalid candidate ID")]
    InvalidReference { candidate_id: CandidateId },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Malformed identity encodings
    #[error("Invalid identity: {message}")]
    Identity { message: String },

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create a new invalid reference error
    pub fn invalid_reference(candidate_id: CandidateId) -> Self {
        Self::InvalidReference { candidate_id }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new identity error
    pub fn identity(message: impl Into<String>) -> Self {
        Self::Identity {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error is a rejected precondition of a registry operation
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::InvalidReference { .. })
    }
}

/// Convenience macros for creating specific error types
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::Error::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::Error::internal($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::internal(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let ref_err = Error::invalid_reference(7);
        assert!(matches!(ref_err, Error::InvalidReference { candidate_id: 7 }));

        let config_err = Error::config("missing owner");
        assert!(matches!(config_err, Error::Config { .. }));

        let identity_err = Error::identity("bad hex");
        assert!(matches!(identity_err, Error::Identity { .. }));
    }

    #[test]
    fn test_registry_error_messages() {
        assert_eq!(Error::Unauthorized.to_string(), "Invalid owner");
        assert_eq!(Error::invalid_reference(5).to_string(), "Invalid candidate ID");

        assert!(Error::Unauthorized.is_precondition());
        assert!(Error::invalid_reference(0).is_precondition());
        assert!(!Error::internal("poisoned").is_precondition());
    }

    #[test]
    fn test_error_macros() {
        let config_err = config_error!("bad value for {}", "LOG_LEVEL");
        assert_eq!(config_err.to_string(), "Configuration error: bad value for LOG_LEVEL");

        let internal_err = internal_error!("lock poisoned");
        assert!(matches!(internal_err, Error::Internal { .. }));
    }
}
