//! Log level parsing

use serde::Serialize;
use std::fmt;

/// Severity threshold read from `LOG_LEVEL`.
///
/// Accepts `DEBUG`, `INFO`, `WARNING`, `ERROR` and `CRITICAL` in any case.
/// Anything else, including an unset variable, means `ERROR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    #[default]
    Error,
    Critical,
}

impl LogLevel {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "WARNING" => LogLevel::Warning,
            "CRITICAL" => LogLevel::Critical,
            _ => LogLevel::Error,
        }
    }

    /// The `tracing` level used as the maximum enabled level.
    ///
    /// `tracing` has no level above ERROR, so CRITICAL maps to ERROR.
    pub fn as_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error | LogLevel::Critical => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels_case_insensitively() {
        assert_eq!(LogLevel::parse("DEBUG"), LogLevel::Debug);
        assert_eq!(LogLevel::parse("info"), LogLevel::Info);
        assert_eq!(LogLevel::parse("Warning"), LogLevel::Warning);
        assert_eq!(LogLevel::parse("error"), LogLevel::Error);
        assert_eq!(LogLevel::parse("critical"), LogLevel::Critical);
    }

    #[test]
    fn unknown_values_fall_back_to_error() {
        assert_eq!(LogLevel::parse("verbose"), LogLevel::Error);
        assert_eq!(LogLevel::parse(""), LogLevel::Error);
        assert_eq!(LogLevel::parse("None"), LogLevel::Error);
        assert_eq!(LogLevel::parse("WARN"), LogLevel::Error);
    }

    #[test]
    fn maps_to_tracing_levels() {
        assert_eq!(LogLevel::Warning.as_tracing_level(), tracing::Level::WARN);
        assert_eq!(LogLevel::Critical.as_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Debug.as_tracing_level(), tracing::Level::DEBUG);
    }
}
