//! Runtime errors.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failure talking to the runtime API itself. Fatal for the process.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("AWS_LAMBDA_RUNTIME_API is not set")]
    MissingRuntimeApi,

    #[error("runtime API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("runtime API returned status {0}")]
    UnexpectedStatus(u16),

    #[error("invocation is missing the {0} header")]
    MissingHeader(&'static str),
}

/// Error document reported for a single failed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationError {
    #[serde(rename = "errorType")]
    pub error_type: String,
    #[serde(rename = "errorMessage")]
    pub error_message: String,
}

impl InvocationError {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            error_message: message.into(),
        }
    }

    /// The invocation payload could not be decoded.
    pub fn invalid_event(message: impl fmt::Display) -> Self {
        Self::new("InvalidEvent", message.to_string())
    }
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.error_message)
    }
}

impl std::error::Error for InvocationError {}
