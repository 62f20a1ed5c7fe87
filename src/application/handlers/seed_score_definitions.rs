//! SeedScoreDefinitionsHandler - Writes the default weight table on provisioning.
//!
//! `Create` and `Update` requests write all definitions in table order and stop
//! at the first failure. `Delete` writes nothing so teardown never blocks.
//! Exactly one status document is then delivered to the callback URL; a
//! delivery failure is logged and does not change the outcome.

use serde::Serialize;
use serde_json::Map;
use std::sync::Arc;

use crate::application::InvocationContext;
use crate::domain::foundation::{DomainError, ProjectId};
use crate::domain::records::{ProvisioningRequest, ProvisioningResponse, ProvisioningStatus, RequestType};
use crate::domain::scoring::ScoreDefinition;
use crate::ports::{ProvisioningResponder, ScoreDefinitionRepository};

/// Command to seed the weight table for one provisioning request.
#[derive(Debug, Clone)]
pub struct SeedScoreDefinitionsCommand {
    pub request: ProvisioningRequest,
    pub context: InvocationContext,
}

/// Result of a seeding run, returned as the invocation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedScoreDefinitionsResult {
    pub status: ProvisioningStatus,
    pub definitions_written: usize,
    pub response_delivered: bool,
}

/// Handler for provisioning requests.
pub struct SeedScoreDefinitionsHandler {
    definitions: Arc<dyn ScoreDefinitionRepository>,
    responder: Arc<dyn ProvisioningResponder>,
    project_id: ProjectId,
}

impl SeedScoreDefinitionsHandler {
    pub fn new(
        definitions: Arc<dyn ScoreDefinitionRepository>,
        responder: Arc<dyn ProvisioningResponder>,
        project_id: ProjectId,
    ) -> Self {
        Self {
            definitions,
            responder,
            project_id,
        }
    }

    pub async fn handle(&self, cmd: SeedScoreDefinitionsCommand) -> SeedScoreDefinitionsResult {
        let request = &cmd.request;
        tracing::info!(
            request_type = ?request.request_type,
            logical_resource_id = %request.logical_resource_id,
            project_id = %self.project_id,
            "Received provisioning request"
        );

        // 1. Seed (or not) according to the request type
        let (status, definitions_written) = match request.request_type {
            RequestType::Create | RequestType::Update => match self.seed().await {
                Ok(written) => (ProvisioningStatus::Success, written),
                Err((written, err)) => {
                    tracing::error!(
                        error = %err,
                        definitions_written = written,
                        "Seeding score definitions failed"
                    );
                    (ProvisioningStatus::Failed, written)
                }
            },
            RequestType::Delete => (ProvisioningStatus::Success, 0),
        };

        // 2. Report back to the provisioning engine
        let response = ProvisioningResponse::for_request(
            request,
            status,
            &cmd.context.log_stream_name,
            Map::new(),
        );
        let response_delivered = match self.responder.respond(&request.response_url, &response).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(error = %err, "Failed to deliver provisioning response");
                false
            }
        };

        SeedScoreDefinitionsResult {
            status,
            definitions_written,
            response_delivered,
        }
    }

    /// Write every default definition. On failure returns how many were
    /// written before it.
    async fn seed(&self) -> Result<usize, (usize, DomainError)> {
        let mut written = 0;
        for definition in ScoreDefinition::defaults_for(&self.project_id) {
            self.definitions
                .put(&definition)
                .await
                .map_err(|e| (written, e))?;
            tracing::debug!(
                event_type = %definition.event_type,
                score_offset = definition.score_offset,
                "Wrote score definition"
            );
            written += 1;
        }
        Ok(written)
    }
}
