//! Application-level configuration section

use crate::validation::{ConfigSection, ValidationError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Log level for application logging
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ValidationError::with_value(
                "app.log_level",
                "must be one of: error, warn, info, debug, trace",
                s,
            )),
        }
    }
}

/// Application-level settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Log level for application output
    pub log_level: LogLevel,

    /// Enable debug mode (raises logging to at least debug)
    pub debug_mode: bool,
}

impl AppConfig {
    /// Level to hand to the logger, taking debug mode into account
    pub fn effective_log_level(&self) -> LogLevel {
        if self.debug_mode && self.log_level.as_filter() < log::LevelFilter::Debug {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            debug_mode: false,
        }
    }
}

impl ConfigSection for AppConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        // Both fields are closed enums; serde already rejects anything else
        Ok(())
    }

    fn merge(&mut self, other: Self) {
        self.log_level = other.log_level;
        self.debug_mode = other.debug_mode;
    }

    fn section_name(&self) -> &'static str {
        "app"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_merge() {
        let mut base = AppConfig::default();
        let other = AppConfig {
            log_level: LogLevel::Trace,
            debug_mode: true,
        };

        base.merge(other);
        assert_eq!(base.log_level, LogLevel::Trace);
        assert!(base.debug_mode);
    }

    #[test]
    fn test_log_level_parse_and_display() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" debug ".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("loud".parse::<LogLevel>().is_err());

        assert_eq!(LogLevel::Error.to_string(), "error");
        assert_eq!(LogLevel::Info.as_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_debug_mode_raises_level() {
        let config = AppConfig {
            log_level: LogLevel::Warn,
            debug_mode: true,
        };
        assert_eq!(config.effective_log_level(), LogLevel::Debug);

        let config = AppConfig {
            log_level: LogLevel::Trace,
            debug_mode: true,
        };
        assert_eq!(config.effective_log_level(), LogLevel::Trace);
    }
}
