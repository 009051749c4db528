//! Configuration manager - main API for config operations

use crate::persistence::{ConfigFile, LoadReport};
use crate::{Config, ConfigError, ConfigResult, LogLevel};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variables that override file values
pub const ENV_API_BASE_URL: &str = "LIBRIS_API_BASE_URL";
pub const ENV_API_TIMEOUT_SECS: &str = "LIBRIS_API_TIMEOUT_SECS";
pub const ENV_CATALOG_PAGE_SIZE: &str = "LIBRIS_CATALOG_PAGE_SIZE";
pub const ENV_CATALOG_SEARCH_DEBOUNCE_MS: &str = "LIBRIS_CATALOG_SEARCH_DEBOUNCE_MS";
pub const ENV_APP_LOG_LEVEL: &str = "LIBRIS_APP_LOG_LEVEL";

/// Main configuration manager
///
/// Handles file paths, defaults, validation and environment overrides.
pub struct ConfigManager {
    file: ConfigFile,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager using the default config directory
    ///
    /// - Linux: `~/.config/libris/`
    /// - macOS: `~/Library/Application Support/libris/`
    /// - Windows: `%APPDATA%\libris\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::default_config_dir()?;
        Self::with_directory(config_dir)
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let file = ConfigFile::new(config_dir.join("config.toml"));
        Ok(Self { file, config_dir })
    }

    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "libris")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Could not determine user config directory".to_string(),
            })
    }

    /// Returns the config directory path
    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// Path of the copy kept from before the last save
    pub fn backup_path(&self) -> PathBuf {
        self.file.backup_path()
    }

    /// Loads the configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file is corrupted, returns an error.
    pub fn load(&self) -> ConfigResult<Config> {
        self.file.read().map(|(config, _)| config)
    }

    /// Loads the file and reports which sections it sets, which keys are
    /// unknown and which values are out of range
    pub fn inspect(&self) -> ConfigResult<LoadReport> {
        self.file.read().map(|(_, report)| report)
    }

    /// Loads the configuration, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Validates and atomically saves the configuration
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.file.write(config)
    }

    /// Loads the config, applies `update_fn` and saves the result
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use libris_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.catalog.page_size = 20;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes a default config file if one doesn't exist
    ///
    /// Returns Ok(true) if a new file was created, Ok(false) if one already exists.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.save(&Config::default())?;
        log::info!("Wrote default config to {}", self.config_path().display());
        Ok(true)
    }

    /// Overwrites the config file with default values
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Validates the current configuration file
    ///
    /// Returns every validation message found; empty means valid.
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let report = self.inspect()?;
        Ok(report.problems.iter().map(|e| e.to_string()).collect())
    }

    /// Loads the config file and applies `LIBRIS_*` environment overrides
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

        if let Err(errors) = config.validate() {
            log::warn!(
                "Config validation warnings after env overrides: {:?}",
                errors
            );
        }

        Ok(config)
    }
}

/// Applies overrides found through `lookup` (normally the process environment)
///
/// Variables follow the pattern `LIBRIS_SECTION_FIELD`. A value that does
/// not parse is an error rather than being silently ignored.
pub fn apply_env_overrides<L>(config: &mut Config, lookup: L) -> ConfigResult<()>
where
    L: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_BASE_URL) {
        config.api.base_url = url;
    }

    if let Some(value) = lookup(ENV_API_TIMEOUT_SECS) {
        config.api.timeout_secs = parse_override(ENV_API_TIMEOUT_SECS, &value)?;
    }

    if let Some(value) = lookup(ENV_CATALOG_PAGE_SIZE) {
        config.catalog.page_size = parse_override(ENV_CATALOG_PAGE_SIZE, &value)?;
    }

    if let Some(value) = lookup(ENV_CATALOG_SEARCH_DEBOUNCE_MS) {
        config.catalog.search_debounce_ms =
            parse_override(ENV_CATALOG_SEARCH_DEBOUNCE_MS, &value)?;
    }

    if let Some(value) = lookup(ENV_APP_LOG_LEVEL) {
        config.app.log_level = parse_override::<LogLevel>(ENV_APP_LOG_LEVEL, &value)?;
        log::info!("Log level override: {}", config.app.log_level);
    }

    Ok(())
}

fn parse_override<T: FromStr>(var: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride {
            var: var.to_string(),
            value: value.to_string(),
        })
}
