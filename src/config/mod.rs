//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Variable names are the plain
//! upper-case field names, e.g. `PINPOINT_PROJECT_ID` -> `pinpoint_project_id`.
//!
//! # Example
//!
//! ```no_run
//! use engagement_scoring::config::{AppConfig, HandlerKind};
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate_for(HandlerKind::Scorer).expect("Invalid configuration");
//! ```

mod error;
mod log_level;

pub use error::{ConfigError, ValidationError};
pub use log_level::LogLevel;

use serde::Deserialize;

/// Which executable is starting. Each needs a different subset of settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Seeder,
    Scorer,
    ProfileUpdater,
}

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Project whose weights and scores are handled
    #[serde(default)]
    pub pinpoint_project_id: Option<String>,

    /// Table holding the event-type weights
    #[serde(default)]
    pub scoring_definition_table: Option<String>,

    /// Table holding the running per-user scores
    #[serde(default)]
    pub user_score_table: Option<String>,

    /// Raw `LOG_LEVEL` value, see [`LogLevel::parse`]
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_region")]
    pub aws_region: String,

    /// Overrides the regional DynamoDB endpoint
    #[serde(default)]
    pub dynamodb_endpoint: Option<String>,

    /// Overrides the regional Pinpoint endpoint
    #[serde(default)]
    pub pinpoint_endpoint: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads every environment variable, lower-casing its name
    /// 3. Deserializes into the typed configuration struct
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Check that everything the given handler needs is present
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first missing or malformed value.
    pub fn validate_for(&self, kind: HandlerKind) -> Result<(), ValidationError> {
        match kind {
            HandlerKind::Seeder => {
                self.pinpoint_project_id()?;
                self.scoring_definition_table()?;
            }
            HandlerKind::Scorer => {
                self.pinpoint_project_id()?;
                self.scoring_definition_table()?;
                self.user_score_table()?;
            }
            HandlerKind::ProfileUpdater => {}
        }

        if let Some(endpoint) = self.dynamodb_endpoint() {
            check_url(endpoint, "DYNAMODB_ENDPOINT")?;
        }
        if let Some(endpoint) = self.pinpoint_endpoint() {
            check_url(endpoint, "PINPOINT_ENDPOINT")?;
        }
        Ok(())
    }

    pub fn pinpoint_project_id(&self) -> Result<&str, ValidationError> {
        required(&self.pinpoint_project_id, "PINPOINT_PROJECT_ID")
    }

    pub fn scoring_definition_table(&self) -> Result<&str, ValidationError> {
        required(&self.scoring_definition_table, "SCORING_DEFINITION_TABLE")
    }

    pub fn user_score_table(&self) -> Result<&str, ValidationError> {
        required(&self.user_score_table, "USER_SCORE_TABLE")
    }

    pub fn dynamodb_endpoint(&self) -> Option<&str> {
        non_empty(&self.dynamodb_endpoint)
    }

    pub fn pinpoint_endpoint(&self) -> Option<&str> {
        non_empty(&self.pinpoint_endpoint)
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ValidationError> {
    non_empty(value).ok_or(ValidationError::MissingRequired(name))
}

fn check_url(value: &str, name: &'static str) -> Result<(), ValidationError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::InvalidEndpointUrl(name))
    }
}

fn default_log_level() -> String {
    "ERROR".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 7] = [
        "PINPOINT_PROJECT_ID",
        "SCORING_DEFINITION_TABLE",
        "USER_SCORE_TABLE",
        "LOG_LEVEL",
        "AWS_REGION",
        "DYNAMODB_ENDPOINT",
        "PINPOINT_ENDPOINT",
    ];

    /// Helper to set environment variables for testing
    fn set_scorer_env() {
        env::set_var("PINPOINT_PROJECT_ID", "proj-1");
        env::set_var("SCORING_DEFINITION_TABLE", "ScoringDefinitions");
        env::set_var("USER_SCORE_TABLE", "UserScores");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn empty() -> AppConfig {
        AppConfig {
            pinpoint_project_id: None,
            scoring_definition_table: None,
            user_score_table: None,
            log_level: default_log_level(),
            aws_region: default_region(),
            dynamodb_endpoint: None,
            pinpoint_endpoint: None,
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        set_scorer_env();
        env::set_var("LOG_LEVEL", "debug");
        env::set_var("AWS_REGION", "eu-west-1");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.pinpoint_project_id().unwrap(), "proj-1");
        assert_eq!(config.scoring_definition_table().unwrap(), "ScoringDefinitions");
        assert_eq!(config.user_score_table().unwrap(), "UserScores");
        assert_eq!(config.log_level(), LogLevel::Debug);
        assert_eq!(config.aws_region, "eu-west-1");
        assert!(config.validate_for(HandlerKind::Scorer).is_ok());
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        let config = result.unwrap();
        assert_eq!(config.log_level(), LogLevel::Error);
        assert_eq!(config.aws_region, "us-east-1");
        assert!(config.dynamodb_endpoint().is_none());
    }

    #[test]
    fn test_scorer_requires_all_tables() {
        let mut config = empty();
        config.pinpoint_project_id = Some("proj-1".to_string());
        config.scoring_definition_table = Some("defs".to_string());

        assert_eq!(
            config.validate_for(HandlerKind::Scorer),
            Err(ValidationError::MissingRequired("USER_SCORE_TABLE"))
        );
        assert!(config.validate_for(HandlerKind::Seeder).is_ok());
    }

    #[test]
    fn test_profile_updater_needs_nothing() {
        assert!(empty().validate_for(HandlerKind::ProfileUpdater).is_ok());
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let mut config = empty();
        config.pinpoint_project_id = Some("  ".to_string());

        assert_eq!(
            config.validate_for(HandlerKind::Seeder),
            Err(ValidationError::MissingRequired("PINPOINT_PROJECT_ID"))
        );
    }

    #[test]
    fn test_endpoint_override_must_be_url() {
        let mut config = empty();
        config.dynamodb_endpoint = Some("localhost:8000".to_string());
        assert_eq!(
            config.validate_for(HandlerKind::ProfileUpdater),
            Err(ValidationError::InvalidEndpointUrl("DYNAMODB_ENDPOINT"))
        );

        config.dynamodb_endpoint = Some("http://localhost:8000".to_string());
        assert!(config.validate_for(HandlerKind::ProfileUpdater).is_ok());
    }
}
