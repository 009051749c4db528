//! Libris configuration system
//!
//! Configuration is a TOML file split into sections, each implementing
//! [`ConfigSection`]. Loading layers defaults, the file and then `LIBRIS_*`
//! environment variables.
//!
//! - **Graceful degradation**: invalid files fall back to defaults with a warning
//! - **Atomic writes**: the config file is never left half-written
//!
//! # Example
//!
//! ```rust
//! use libris_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Catalog server: {}", config.api.base_url);
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

// Config sections
mod api_config;
pub mod app_config;
mod catalog_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{
    apply_env_overrides, ConfigManager, ENV_API_BASE_URL, ENV_API_TIMEOUT_SECS, ENV_APP_LOG_LEVEL,
    ENV_CATALOG_PAGE_SIZE, ENV_CATALOG_SEARCH_DEBOUNCE_MS,
};
pub use persistence::{LoadReport, KNOWN_SECTIONS};
pub use validation::{ConfigSection, Validator};

pub use api_config::ApiConfig;
pub use app_config::{AppConfig, LogLevel};
pub use catalog_config::CatalogConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Remote catalog API
    pub api: ApiConfig,

    /// Collection view behaviour
    pub catalog: CatalogConfig,

    /// Application-level settings
    pub app: AppConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.api.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.catalog.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    ///
    /// Used for override chains: defaults < file < env vars
    pub fn merge(&mut self, other: Config) {
        self.api.merge(other.api);
        self.catalog.merge(other.catalog);
        self.app.merge(other.app);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: ApiConfig::default(),
            catalog: CatalogConfig::default(),
            app: AppConfig::default(),
        }
    }
}
