//! Per-record outcomes and their aggregation into a batch report.
//!
//! Every record of a batch ends in exactly one of three states: processed,
//! ignored (the connectivity-test sentinel) or skipped with a reason. Skips
//! are never retried; the report is the only trace besides the log lines.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::foundation::{EventType, UserId};

/// Why a record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Payload was not base64 or not the expected JSON shape.
    InvalidPayload,
    /// No weight seeded for the event type in this project.
    UnknownEventType,
    /// The weight table could not be read.
    DefinitionLookupFailed,
    /// The client endpoint could not be resolved.
    EndpointLookupFailed,
    /// The endpoint exists but is not linked to a user.
    EndpointWithoutUser,
    /// The atomic increment failed.
    ScoreUpdateFailed,
    /// Change record without a new image (e.g. a row removal).
    MissingNewImage,
    /// New image lacks a key attribute or holds a malformed value.
    InvalidChangeRecord,
    /// The user's endpoints could not be listed.
    EndpointQueryFailed,
    /// Every endpoint update for the user failed.
    EndpointUpdateFailed,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::InvalidPayload => "invalid_payload",
            SkipReason::UnknownEventType => "unknown_event_type",
            SkipReason::DefinitionLookupFailed => "definition_lookup_failed",
            SkipReason::EndpointLookupFailed => "endpoint_lookup_failed",
            SkipReason::EndpointWithoutUser => "endpoint_without_user",
            SkipReason::ScoreUpdateFailed => "score_update_failed",
            SkipReason::MissingNewImage => "missing_new_image",
            SkipReason::InvalidChangeRecord => "invalid_change_record",
            SkipReason::EndpointQueryFailed => "endpoint_query_failed",
            SkipReason::EndpointUpdateFailed => "endpoint_update_failed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse state of a finished record, as counted by [`BatchReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Processed,
    Ignored,
    Skipped(SkipReason),
}

/// Result of scoring one engagement event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringOutcome {
    /// The user's score was incremented.
    Scored {
        user_id: UserId,
        event_type: EventType,
        score_offset: i64,
        new_score: i64,
    },
    /// Connectivity-test event; nothing looked up or written.
    Ignored,
    Skipped(SkipReason),
}

impl ScoringOutcome {
    pub fn status(&self) -> RecordStatus {
        match self {
            ScoringOutcome::Scored { .. } => RecordStatus::Processed,
            ScoringOutcome::Ignored => RecordStatus::Ignored,
            ScoringOutcome::Skipped(reason) => RecordStatus::Skipped(*reason),
        }
    }
}

/// Result of pushing one changed score to the user's endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropagationOutcome {
    Propagated {
        user_id: UserId,
        score: i64,
        endpoints_updated: usize,
        endpoints_failed: usize,
    },
    Skipped(SkipReason),
}

impl PropagationOutcome {
    pub fn status(&self) -> RecordStatus {
        match self {
            PropagationOutcome::Propagated { .. } => RecordStatus::Processed,
            PropagationOutcome::Skipped(reason) => RecordStatus::Skipped(*reason),
        }
    }
}

/// Aggregated outcome of one batch, returned to the trigger as the
/// invocation response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub processed: usize,
    pub ignored: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one finished record.
    pub fn record(&mut self, status: RecordStatus) {
        self.total += 1;
        match status {
            RecordStatus::Processed => self.processed += 1,
            RecordStatus::Ignored => self.ignored += 1,
            RecordStatus::Skipped(reason) => *self.skipped.entry(reason).or_insert(0) += 1,
        }
    }

    /// Number of skipped records across all reasons.
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Number of records skipped for one reason.
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}
