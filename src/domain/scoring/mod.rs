//! Scoring module - weight table, running scores and per-record outcomes.

mod definition;
mod outcome;
mod user_score;

pub use definition::{is_test_event, ScoreDefinition, DEFAULT_SCORE_WEIGHTS, TEST_EVENT_TYPE};
pub use outcome::{BatchReport, PropagationOutcome, RecordStatus, ScoringOutcome, SkipReason};
pub use user_score::increment;
