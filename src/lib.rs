//! Engagement Scoring - Per-user engagement scores from marketing events
//!
//! Three event-driven handlers share this crate:
//! - seeding the event-type weight table on provisioning
//! - accumulating event weights into per-user scores
//! - pushing changed scores onto every endpoint of the user

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod runtime;
pub mod telemetry;

#[cfg(test)]
mod test_support;
