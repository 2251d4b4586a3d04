//! Error types for the intentgate routing engine
//!
//! Collaborator failures are recoverable by design: the decision engine
//! converts them into absent signals or zero-confidence defaults and
//! reports them to telemetry. Nothing in this enum escapes `decide`.

use thiserror::Error;

/// Main error type for collaborator calls and configuration
#[derive(Error, Debug)]
pub enum RouterError {
    /// HTTP transport errors
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream returned a non-success status
    #[error("Upstream API error: status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Collaborator output could not be parsed into the expected shape
    #[error("Malformed collaborator output: {0}")]
    MalformedOutput(String),

    /// Collaborator call exceeded its boundary timeout
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = RouterError::Timeout { duration_ms: 15000 };
        assert!(err.to_string().contains("15000"));
    }

    #[test]
    fn test_upstream_status_display() {
        let err = RouterError::UpstreamStatus {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("overloaded"));
    }
}
