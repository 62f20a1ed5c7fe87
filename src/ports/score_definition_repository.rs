//! ScoreDefinitionRepository port - the event-type weight table.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventType, ProjectId};
use crate::domain::scoring::ScoreDefinition;

/// Lookup table mapping `(event_type, project_id)` to a weight.
#[async_trait]
pub trait ScoreDefinitionRepository: Send + Sync {
    /// Write a definition, replacing any existing one with the same key.
    async fn put(&self, definition: &ScoreDefinition) -> Result<(), DomainError>;

    /// Find the definition for an event type within a project.
    ///
    /// Returns `Ok(None)` when the event type was never seeded.
    async fn find(
        &self,
        event_type: &EventType,
        project_id: &ProjectId,
    ) -> Result<Option<ScoreDefinition>, DomainError>;
}
