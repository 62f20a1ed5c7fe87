//! UpdateProfileScoresHandler - Pushes changed scores to every endpoint of the user.
//!
//! Endpoints are updated one after another. A failed endpoint is logged and
//! counted while the remaining endpoints are still updated.

use std::sync::Arc;

use crate::domain::records::{describe_malformed, BatchEntry, ChangeBatch, ChangeRecord, ChangeRecordError};
use crate::domain::scoring::{BatchReport, PropagationOutcome, SkipReason};
use crate::ports::ProfileService;

/// Handler for score-table change batches.
pub struct UpdateProfileScoresHandler {
    profiles: Arc<dyn ProfileService>,
}

impl UpdateProfileScoresHandler {
    pub fn new(profiles: Arc<dyn ProfileService>) -> Self {
        Self { profiles }
    }

    pub async fn handle(&self, batch: &ChangeBatch) -> BatchReport {
        let mut report = BatchReport::new();
        for entry in &batch.records {
            let outcome = match entry {
                BatchEntry::Parsed(record) => self.propagate(record).await,
                BatchEntry::Malformed(raw) => {
                    tracing::error!(shape = describe_malformed(raw), "Unreadable change record");
                    PropagationOutcome::Skipped(SkipReason::InvalidChangeRecord)
                }
            };
            report.record(outcome.status());
        }

        tracing::info!(
            total = report.total,
            processed = report.processed,
            skipped = report.skipped_total(),
            "Propagated score changes"
        );
        report
    }

    /// Propagate one change record.
    pub async fn propagate(&self, record: &ChangeRecord) -> PropagationOutcome {
        let change = match record.score_change() {
            Ok(change) => change,
            Err(ChangeRecordError::MissingNewImage) => {
                tracing::warn!(
                    event_name = record.event_name.as_deref().unwrap_or_default(),
                    "Change record has no new image"
                );
                return PropagationOutcome::Skipped(SkipReason::MissingNewImage);
            }
            Err(e) => {
                tracing::error!(error = %e, "Malformed change record");
                return PropagationOutcome::Skipped(SkipReason::InvalidChangeRecord);
            }
        };

        let endpoints = match self
            .profiles
            .get_user_endpoints(&change.project_id, &change.user_id)
            .await
        {
            Ok(endpoints) => endpoints,
            Err(e) => {
                tracing::error!(user_id = %change.user_id, error = %e, "Failed to list user endpoints");
                return PropagationOutcome::Skipped(SkipReason::EndpointQueryFailed);
            }
        };

        let mut updated = 0;
        let mut failed = 0;
        for endpoint in &endpoints {
            match self
                .profiles
                .update_engagement_score(&change.project_id, &endpoint.id, change.score)
                .await
            {
                Ok(()) => updated += 1,
                Err(e) => {
                    tracing::error!(
                        user_id = %change.user_id,
                        endpoint_id = %endpoint.id,
                        error = %e,
                        "Failed to update endpoint score"
                    );
                    failed += 1;
                }
            }
        }

        if updated == 0 && failed > 0 {
            return PropagationOutcome::Skipped(SkipReason::EndpointUpdateFailed);
        }

        tracing::debug!(
            user_id = %change.user_id,
            score = change.score,
            endpoints_updated = updated,
            endpoints_failed = failed,
            "Updated endpoint scores"
        );
        PropagationOutcome::Propagated {
            user_id: change.user_id,
            score: change.score,
            endpoints_updated: updated,
            endpoints_failed: failed,
        }
    }
}
