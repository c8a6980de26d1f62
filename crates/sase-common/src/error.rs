//! Error types for the OpenSASE forms engine

use thiserror::Error;

/// OpenSASE error type
#[derive(Error, Debug)]
pub enum SaseError {
    /// Form not found
    #[error("form not found: {0}")]
    FormNotFound(String),

    /// Submission not found
    #[error("submission not found: {0}")]
    SubmissionNotFound(String),

    /// Persistence collaborator failed
    #[error("storage error: {0}")]
    StorageError(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    ConfigError(String),
}

/// Result type for OpenSASE
pub type SaseResult<T> = Result<T, SaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SaseError::StorageError("connection reset".into());
        assert_eq!(err.to_string(), "storage error: connection reset");
        assert_eq!(
            SaseError::FormNotFound("contact".into()).to_string(),
            "form not found: contact"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: SaseError = parse.unwrap_err().into();
        assert!(matches!(err, SaseError::Json(_)));
    }
}
