//! Error types for reasonflow.

use thiserror::Error;

/// Primary error type for all reasonflow operations.
///
/// Nothing in the reconciliation loop itself returns this type once output
/// has started: failures observed mid-stream become an
/// [`Outcome`](crate::types::Outcome) instead. `FlowError` covers the edges
/// around the loop (configuration, fragment sources, sinks).
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Upstream error ({code}): {message}")]
    Upstream { code: String, message: String },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl FlowError {
    /// Create an upstream error from a code and message.
    pub fn upstream(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether a fresh attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Stream(_) | Self::Io(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_formats_code_and_message() {
        let err = FlowError::upstream("rate_limit", "slow down");
        assert_eq!(err.to_string(), "Upstream error (rate_limit): slow down");
        assert!(err.is_retryable());
    }

    #[test]
    fn configuration_errors_are_not_retryable() {
        assert!(!FlowError::Configuration("bad".into()).is_retryable());
        assert!(!FlowError::Sink("closed".into()).is_retryable());
    }
}
