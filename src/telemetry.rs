//! Structured logging setup.
//!
//! Every executable installs one JSON subscriber at start-up. The level comes
//! from configuration and stays fixed for the life of the process.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ConfigError, LogLevel};

/// Install the global JSON subscriber.
///
/// Returns `false` if a subscriber was already installed, in which case the
/// existing one is kept.
pub fn init(level: LogLevel) -> bool {
    let filter = EnvFilter::default()
        .add_directive(LevelFilter::from_level(level.as_tracing_level()).into());

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Install the subscriber for a configuration load result.
///
/// A failed load falls back to the default level so the failure itself can
/// still be logged. Returns the level that was requested.
pub fn init_for(config: &Result<AppConfig, ConfigError>) -> LogLevel {
    let level = config
        .as_ref()
        .map(AppConfig::log_level)
        .unwrap_or_default();
    init(level);
    level
}
