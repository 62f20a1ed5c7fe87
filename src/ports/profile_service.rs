//! ProfileService port for the external marketing-profile service.
//!
//! The service owns endpoints (one per device or channel) and links each to
//! at most one user. This system reads those links and overwrites a single
//! user attribute on every endpoint of a user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{EndpointId, ProjectId, UserId};

/// User attribute that carries the engagement score on each endpoint.
pub const ENGAGEMENT_SCORE_ATTRIBUTE: &str = "EngagementScore";

/// Port for the marketing-profile service.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Fetch a single endpoint.
    async fn get_endpoint(
        &self,
        project_id: &ProjectId,
        endpoint_id: &EndpointId,
    ) -> Result<Endpoint, ProfileServiceError>;

    /// List every endpoint linked to a user.
    async fn get_user_endpoints(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Vec<Endpoint>, ProfileServiceError>;

    /// Overwrite the endpoint's engagement score attribute with `[score]`.
    async fn update_engagement_score(
        &self,
        project_id: &ProjectId,
        endpoint_id: &EndpointId,
        score: i64,
    ) -> Result<(), ProfileServiceError>;
}

/// Endpoint as seen by this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EndpointId,

    /// Owning user, if the endpoint has been linked to one.
    pub user_id: Option<UserId>,

    /// Delivery channel, e.g. `EMAIL` or `SMS`.
    pub channel_type: Option<String>,
}

impl Endpoint {
    pub fn new(id: EndpointId, user_id: Option<UserId>) -> Self {
        Self {
            id,
            user_id,
            channel_type: None,
        }
    }
}

/// Errors from profile service operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileServiceError {
    /// Error code for categorization.
    pub code: ProfileErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation could succeed if repeated.
    pub retryable: bool,
}

impl ProfileServiceError {
    pub fn new(code: ProfileErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(ProfileErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProfileErrorCode::NetworkError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProfileErrorCode::InvalidResponse, message)
    }
}

impl fmt::Display for ProfileServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ProfileServiceError {}

/// Profile service error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileErrorCode {
    NotFound,
    BadRequest,
    AccessDenied,
    Throttled,
    ServiceUnavailable,
    NetworkError,
    InvalidResponse,
}

impl ProfileErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProfileErrorCode::Throttled
                | ProfileErrorCode::ServiceUnavailable
                | ProfileErrorCode::NetworkError
        )
    }

    /// Maps an HTTP status from the service to an error code.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => ProfileErrorCode::NotFound,
            401 | 403 => ProfileErrorCode::AccessDenied,
            429 => ProfileErrorCode::Throttled,
            500..=599 => ProfileErrorCode::ServiceUnavailable,
            _ => ProfileErrorCode::BadRequest,
        }
    }
}

impl fmt::Display for ProfileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProfileErrorCode::NotFound => "not_found",
            ProfileErrorCode::BadRequest => "bad_request",
            ProfileErrorCode::AccessDenied => "access_denied",
            ProfileErrorCode::Throttled => "throttled",
            ProfileErrorCode::ServiceUnavailable => "service_unavailable",
            ProfileErrorCode::NetworkError => "network_error",
            ProfileErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}
