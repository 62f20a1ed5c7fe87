//! Application handlers.
//!
//! One handler per trigger. Each orchestrates ports and turns every failure
//! into an explicit outcome instead of an invocation error.

mod score_engagement_events;
mod seed_score_definitions;
mod update_profile_scores;

pub use score_engagement_events::ScoreEngagementEventsHandler;
pub use seed_score_definitions::{
    SeedScoreDefinitionsCommand, SeedScoreDefinitionsHandler, SeedScoreDefinitionsResult,
};
pub use update_profile_scores::UpdateProfileScoresHandler;
