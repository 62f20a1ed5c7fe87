//! Strongly-typed identifier value objects.
//!
//! Every identifier in this system is an opaque string owned by an external
//! service (the marketing project, its endpoints and users). The only rule
//! enforced locally is that none of them may be empty.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Identifier of the marketing project that owns scores and endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a new ProjectId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("project_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a user in the profile service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a single addressable endpoint (device or channel).
///
/// Engagement events carry this as `client.client_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(String);

impl EndpointId {
    /// Creates a new EndpointId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("endpoint_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category tag of an engagement action, e.g. `_email.click`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(String);

impl EventType {
    /// Creates a new EventType, returning error if empty.
    pub fn new(event_type: impl Into<String>) -> Result<Self, ValidationError> {
        let event_type = event_type.into();
        if event_type.is_empty() {
            return Err(ValidationError::empty_field("event_type"));
        }
        Ok(Self(event_type))
    }

    /// Creates an EventType from a compile-time constant.
    pub(crate) fn from_static(event_type: &'static str) -> Self {
        debug_assert!(!event_type.is_empty());
        Self(event_type.to_string())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_id_accepts_non_empty_string() {
        let id = ProjectId::new("abc123").unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn project_id_rejects_empty_string() {
        let result = ProjectId::new("");
        match result {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "project_id"),
            _ => panic!("Expected EmptyField error"),
        }
    }

    #[test]
    fn user_id_rejects_empty_string() {
        let result = UserId::new("");
        match result {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "user_id"),
            _ => panic!("Expected EmptyField error"),
        }
    }

    #[test]
    fn endpoint_id_rejects_empty_string() {
        assert!(EndpointId::new("").is_err());
    }

    #[test]
    fn event_type_keeps_case() {
        let event_type = EventType::new("_SMS.SUCCESS").unwrap();
        assert_eq!(event_type.to_string(), "_SMS.SUCCESS");
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = UserId::new("user-456").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"user-456\"");
    }
}
