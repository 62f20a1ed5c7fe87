//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (identifiers, errors)
//! - `scoring` - Weight table, running scores, per-record outcomes
//! - `records` - Wire formats of the stream, change and provisioning triggers

pub mod foundation;
pub mod records;
pub mod scoring;
