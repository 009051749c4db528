//! Reading and writing `config.toml`
//!
//! The file is read as a raw TOML table first so the loader can tell which
//! sections were written by hand and which keys it does not know, before the
//! table is decoded into [`Config`].

use crate::{Config, ConfigError, ConfigResult, ValidationError, CONFIG_VERSION};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Top-level tables the loader understands
pub const KNOWN_SECTIONS: [&str; 3] = ["api", "catalog", "app"];

const HEADER: &str = "\
# libris configuration
# LIBRIS_<SECTION>_<FIELD> environment variables override values set here.

";

/// What a load found besides the decoded config
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// False when the file was missing and defaults were used
    pub file_found: bool,
    /// Known sections present in the file; the rest come from defaults
    pub sections: Vec<String>,
    /// Top-level keys that are neither `version` nor a known section
    pub unknown_keys: Vec<String>,
    /// Values that are out of range, by dotted field path
    pub problems: Vec<ValidationError>,
}

impl LoadReport {
    /// True if the file named `section`
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.iter().any(|s| s == section)
    }
}

/// The config file on disk
#[derive(Debug, Clone)]
pub(crate) struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the previous file, refreshed on every write
    pub(crate) fn backup_path(&self) -> PathBuf {
        self.path.with_extension("toml.backup")
    }

    /// Decodes the file, reporting sections, unknown keys and bad values.
    ///
    /// A missing file yields defaults. Out-of-range values are reported, not
    /// rejected, so a hand-edited file still loads.
    pub(crate) fn read(&self) -> ConfigResult<(Config, LoadReport)> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", self.path.display());
                return Ok((Config::default(), LoadReport::default()));
            }
            Err(source) => {
                return Err(ConfigError::ReadError {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if text.trim().is_empty() {
            return Err(ConfigError::ReadError {
                path: self.path.clone(),
                source: std::io::Error::new(ErrorKind::InvalidData, "config file is empty"),
            });
        }

        let table: toml::Table = toml::from_str(&text).map_err(|source| self.parse_error(source))?;

        let mut report = LoadReport {
            file_found: true,
            ..LoadReport::default()
        };
        for key in table.keys() {
            if KNOWN_SECTIONS.contains(&key.as_str()) {
                report.sections.push(key.clone());
            } else if key != "version" {
                log::warn!("Ignoring unknown config key '{}'", key);
                report.unknown_keys.push(key.clone());
            }
        }

        report.unknown_keys.sort();

        let config: Config = toml::Value::Table(table)
            .try_into()
            .map_err(|source| self.parse_error(source))?;

        if config.version > CONFIG_VERSION {
            log::warn!(
                "Config version {} is newer than {}; newer settings are ignored",
                config.version,
                CONFIG_VERSION
            );
        }

        if let Err(problems) = config.validate() {
            for problem in &problems {
                log::warn!("{}", problem);
            }
            report.problems = problems;
        }

        log::debug!(
            "Loaded {} with sections {:?}",
            self.path.display(),
            report.sections
        );
        Ok((config, report))
    }

    /// Replaces the file with `config`, keeping the old one as a backup.
    ///
    /// The new contents are staged next to the target and renamed over it,
    /// so readers see either the old file or the new one.
    pub(crate) fn write(&self, config: &Config) -> ConfigResult<()> {
        if let Err(problems) = config.validate() {
            let fields: Vec<String> = problems.iter().map(|p| p.to_string()).collect();
            return Err(ConfigError::ValidationError(fields.join("; ")));
        }

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|source| ConfigError::DirectoryCreationError {
            path: dir.to_path_buf(),
            source,
        })?;

        let body = format!("{}{}", HEADER, toml::to_string_pretty(config)?);

        let mut staged = tempfile::Builder::new()
            .prefix(".config-")
            .suffix(".toml.tmp")
            .tempfile_in(dir)?;
        staged.write_all(body.as_bytes())?;
        staged.as_file().sync_all()?;

        match fs::copy(&self.path, self.backup_path()) {
            Ok(_) => log::debug!("Previous config kept at {}", self.backup_path().display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(ConfigError::BackupError { source }),
        }

        staged
            .persist(&self.path)
            .map_err(|e| ConfigError::WriteError {
                path: self.path.clone(),
                source: e.error,
            })?;

        log::info!("Config written to {}", self.path.display());
        Ok(())
    }

    fn parse_error(&self, source: toml::de::Error) -> ConfigError {
        ConfigError::ParseError {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_file(contents: Option<&str>) -> (TempDir, ConfigFile) {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        if let Some(contents) = contents {
            fs::write(&path, contents).expect("seed config");
        }
        (dir, ConfigFile::new(path))
    }

    #[test]
    fn test_missing_file_reads_as_defaults() {
        let (_dir, file) = config_file(None);

        let (config, report) = file.read().expect("defaults");
        assert_eq!(config, Config::default());
        assert!(!report.file_found);
        assert!(report.sections.is_empty());
    }

    #[test]
    fn test_report_lists_sections_and_unknown_keys() {
        let (_dir, file) = config_file(Some(
            "version = 1\ntheme = \"dark\"\n\n[catalog]\npage_size = 20\n\n[player]\nvolume = 3\n",
        ));

        let (config, report) = file.read().expect("loads");
        assert_eq!(config.catalog.page_size, 20);
        assert!(report.file_found);
        assert!(report.has_section("catalog"));
        assert!(!report.has_section("api"));
        assert_eq!(report.unknown_keys, vec!["player", "theme"]);
        assert!(report.problems.is_empty());
    }

    #[test]
    fn test_out_of_range_values_are_reported_by_field() {
        let (_dir, file) = config_file(Some("[api]\ntimeout_secs = 0\n\n[catalog]\npage_size = 500\n"));

        let (config, report) = file.read().expect("loads anyway");
        assert_eq!(config.catalog.page_size, 500);

        let fields: Vec<_> = report.problems.iter().map(|p| p.field.as_str()).collect();
        assert_eq!(fields, vec!["api.timeout_secs", "catalog.page_size"]);
    }

    #[test]
    fn test_newer_version_still_loads() {
        let (_dir, file) = config_file(Some("version = 7\n[app]\ndebug_mode = true\n"));

        let (config, _) = file.read().expect("loads");
        assert_eq!(config.version, 7);
        assert!(config.app.debug_mode);
    }

    #[test]
    fn test_blank_file_is_a_read_error() {
        let (_dir, file) = config_file(Some(" \n\t\n"));
        assert!(matches!(file.read(), Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_wrong_value_type_is_a_parse_error() {
        let (_dir, file) = config_file(Some("[catalog]\npage_size = \"ten\"\n"));
        assert!(matches!(file.read(), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_write_leaves_only_config_and_backup() {
        let dir = TempDir::new().expect("temp dir");
        let file = ConfigFile::new(dir.path().join("nested").join("config.toml"));

        file.write(&Config::default()).expect("first write");
        assert!(!file.backup_path().exists());

        let mut config = Config::default();
        config.catalog.page_size = 30;
        file.write(&config).expect("second write");

        let mut names: Vec<String> = fs::read_dir(dir.path().join("nested"))
            .expect("list dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["config.toml", "config.toml.backup"]);

        let (backup, _) = ConfigFile::new(file.backup_path()).read().expect("backup parses");
        assert_eq!(backup, Config::default());
        assert_eq!(file.read().expect("reload").0.catalog.page_size, 30);
    }

    #[test]
    fn test_written_file_starts_with_header_and_names_every_section() {
        let (_dir, file) = config_file(None);
        file.write(&Config::default()).expect("write");

        let text = fs::read_to_string(file.path()).expect("read back");
        assert!(text.starts_with("# libris configuration"));

        let (_, report) = file.read().expect("reload");
        assert_eq!(report.sections.len(), KNOWN_SECTIONS.len());
    }

    #[test]
    fn test_invalid_config_is_not_written() {
        let (_dir, file) = config_file(Some("[catalog]\npage_size = 15\n"));

        let mut config = Config::default();
        config.catalog.categories.clear();
        let err = file.write(&config).unwrap_err();

        assert!(matches!(err, ConfigError::ValidationError(ref msg) if msg.contains("catalog.categories")));
        assert_eq!(fs::read_to_string(file.path()).expect("untouched"), "[catalog]\npage_size = 15\n");
    }
}
