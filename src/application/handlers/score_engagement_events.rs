//! ScoreEngagementEventsHandler - Accumulates event weights into user scores.
//!
//! Records are handled one at a time in delivery order. A record that cannot
//! be scored is logged and skipped; it never stops the rest of the batch.

use std::sync::Arc;

use crate::domain::foundation::ProjectId;
use crate::domain::records::{describe_malformed, BatchEntry, StreamBatch, StreamRecord};
use crate::domain::scoring::{is_test_event, BatchReport, ScoringOutcome, SkipReason};
use crate::ports::{ProfileService, ScoreDefinitionRepository, UserScoreRepository};

/// Handler for engagement event batches.
pub struct ScoreEngagementEventsHandler {
    definitions: Arc<dyn ScoreDefinitionRepository>,
    scores: Arc<dyn UserScoreRepository>,
    profiles: Arc<dyn ProfileService>,
    project_id: ProjectId,
}

impl ScoreEngagementEventsHandler {
    pub fn new(
        definitions: Arc<dyn ScoreDefinitionRepository>,
        scores: Arc<dyn UserScoreRepository>,
        profiles: Arc<dyn ProfileService>,
        project_id: ProjectId,
    ) -> Self {
        Self {
            definitions,
            scores,
            profiles,
            project_id,
        }
    }

    /// Score every record of a batch.
    pub async fn handle(&self, batch: &StreamBatch) -> BatchReport {
        let mut report = BatchReport::new();
        for entry in &batch.records {
            let outcome = match entry {
                BatchEntry::Parsed(record) => self.score_record(record).await,
                BatchEntry::Malformed(raw) => {
                    tracing::error!(shape = describe_malformed(raw), "Stream record has no payload");
                    ScoringOutcome::Skipped(SkipReason::InvalidPayload)
                }
            };
            report.record(outcome.status());
        }

        tracing::info!(
            total = report.total,
            processed = report.processed,
            ignored = report.ignored,
            skipped = report.skipped_total(),
            "Scored engagement batch"
        );
        report
    }

    /// Score one record.
    pub async fn score_record(&self, record: &StreamRecord) -> ScoringOutcome {
        // 1. Decode the payload
        let event = match record.decode() {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(
                    event_id = record.event_id.as_deref().unwrap_or_default(),
                    error = %e,
                    "Invalid engagement payload"
                );
                return ScoringOutcome::Skipped(SkipReason::InvalidPayload);
            }
        };

        if is_test_event(event.event_type.as_str()) {
            tracing::debug!("Ignoring event stream test record");
            return ScoringOutcome::Ignored;
        }

        // 2. Resolve the weight
        let definition = match self.definitions.find(&event.event_type, &self.project_id).await {
            Ok(Some(definition)) => definition,
            Ok(None) => {
                tracing::error!(
                    event_type = %event.event_type,
                    project_id = %self.project_id,
                    "No score definition for event type"
                );
                return ScoringOutcome::Skipped(SkipReason::UnknownEventType);
            }
            Err(e) => {
                tracing::error!(event_type = %event.event_type, error = %e, "Score definition lookup failed");
                return ScoringOutcome::Skipped(SkipReason::DefinitionLookupFailed);
            }
        };

        // 3. Resolve the user behind the endpoint
        let endpoint = match self.profiles.get_endpoint(&self.project_id, &event.client_id).await {
            Ok(endpoint) => endpoint,
            Err(e) => {
                tracing::error!(client_id = %event.client_id, error = %e, "Endpoint lookup failed");
                return ScoringOutcome::Skipped(SkipReason::EndpointLookupFailed);
            }
        };
        let Some(user_id) = endpoint.user_id else {
            tracing::error!(client_id = %event.client_id, "Endpoint has no user");
            return ScoringOutcome::Skipped(SkipReason::EndpointWithoutUser);
        };

        // 4. Atomically add the weight
        match self
            .scores
            .increment(&user_id, &self.project_id, definition.score_offset)
            .await
        {
            Ok(new_score) => {
                tracing::debug!(
                    user_id = %user_id,
                    event_type = %event.event_type,
                    score_offset = definition.score_offset,
                    new_score,
                    "Incremented user score"
                );
                ScoringOutcome::Scored {
                    user_id,
                    event_type: event.event_type,
                    score_offset: definition.score_offset,
                    new_score,
                }
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Score increment failed");
                ScoringOutcome::Skipped(SkipReason::ScoreUpdateFailed)
            }
        }
    }
}
