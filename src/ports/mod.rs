//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the handlers and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `ScoreDefinitionRepository` - Event-type weight table
//! - `UserScoreRepository` - Running per-user scores (atomic increment)
//!
//! ## External Service Ports
//!
//! - `ProfileService` - Marketing-profile endpoints and users
//! - `ProvisioningResponder` - Provisioning callback delivery

mod profile_service;
mod provisioning_responder;
mod score_definition_repository;
mod user_score_repository;

pub use profile_service::{
    Endpoint, ProfileErrorCode, ProfileService, ProfileServiceError, ENGAGEMENT_SCORE_ATTRIBUTE,
};
pub use provisioning_responder::ProvisioningResponder;
pub use score_definition_repository::ScoreDefinitionRepository;
pub use user_score_repository::UserScoreRepository;
