//! Transport errors shared by the AWS adapters.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ProfileErrorCode, ProfileServiceError};

/// Error talking to an AWS service.
#[derive(Debug, Error)]
pub enum AwsError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),

    #[error("service returned {status}: {error_type}: {message}")]
    Service {
        status: u16,
        error_type: String,
        message: String,
    },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl AwsError {
    /// Build a service error from a non-success response body.
    ///
    /// Both JSON protocol (`__type`) and REST (`Message`) bodies are
    /// understood; anything else is kept verbatim as the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            #[serde(rename = "__type")]
            error_type: Option<String>,
            #[serde(alias = "Message")]
            message: Option<String>,
        }

        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => AwsError::Service {
                status,
                error_type: parsed
                    .error_type
                    .map(|t| t.rsplit('#').next().unwrap_or_default().to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
                message: parsed.message.unwrap_or_default(),
            },
            Err(_) => AwsError::Service {
                status,
                error_type: "Unknown".to_string(),
                message: body.to_string(),
            },
        }
    }

    pub fn is_throttling(&self) -> bool {
        match self {
            AwsError::Service {
                status, error_type, ..
            } => {
                *status == 429
                    || error_type.contains("Throttling")
                    || error_type == "ProvisionedThroughputExceededException"
                    || error_type == "RequestLimitExceeded"
            }
            _ => false,
        }
    }
}

impl From<AwsError> for DomainError {
    fn from(err: AwsError) -> Self {
        let code = if err.is_throttling() {
            ErrorCode::Throttled
        } else {
            ErrorCode::DatabaseError
        };
        DomainError::new(code, err.to_string())
    }
}

impl From<AwsError> for ProfileServiceError {
    fn from(err: AwsError) -> Self {
        match &err {
            AwsError::Transport(_) => ProfileServiceError::network(err.to_string()),
            AwsError::Serialization(_) | AwsError::InvalidResponse(_) => {
                ProfileServiceError::invalid_response(err.to_string())
            }
            AwsError::InvalidUrl(_) => {
                ProfileServiceError::new(ProfileErrorCode::BadRequest, err.to_string())
            }
            AwsError::Service { status, .. } => {
                ProfileServiceError::new(ProfileErrorCode::from_status(*status), err.to_string())
            }
        }
    }
}
