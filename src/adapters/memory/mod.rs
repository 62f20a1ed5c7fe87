//! In-memory adapters.
//!
//! Used by unit and integration tests, and handy for running the handlers
//! locally without any cloud resources.

mod profile_service;
mod provisioning_responder;
mod score_definitions;
mod user_scores;

pub use profile_service::{InMemoryProfileService, ProfileCall};
pub use provisioning_responder::RecordingProvisioningResponder;
pub use score_definitions::InMemoryScoreDefinitionStore;
pub use user_scores::InMemoryUserScoreStore;
