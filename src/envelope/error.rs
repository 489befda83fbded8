//! Envelope decoding errors.

use thiserror::Error;

/// Errors produced while decoding or validating an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The bytes are not JSON, or do not have the envelope's shape.
    #[error("{0}")]
    Syntax(#[from] serde_json::Error),

    /// The JSON is well formed but breaks an envelope rule.
    #[error("{path}: {reason}")]
    Invalid { path: String, reason: String },
}

impl EnvelopeError {
    pub(crate) fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for envelope operations.
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;
