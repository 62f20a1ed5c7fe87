//! Application layer - Handlers and invocation context.
//!
//! This layer orchestrates domain operations and coordinates between ports.

mod context;
pub mod handlers;

pub use context::InvocationContext;
pub use handlers::{
    ScoreEngagementEventsHandler, SeedScoreDefinitionsCommand, SeedScoreDefinitionsHandler,
    SeedScoreDefinitionsResult, UpdateProfileScoresHandler,
};
