//! Runtime configuration for beat storage and logging.
//!
//! # Responsibility
//! - Merge built-in defaults, an optional TOML file, and environment
//!   overrides into one `AppConfig`.
//!
//! # Invariants
//! - Precedence is defaults < file < environment.
//! - Invalid environment values are ignored with a warning, never fatal.
//! - A missing config file is not an error; an unreadable, malformed or
//!   out-of-range one is.

use crate::logging::{default_log_level, normalize_level};
use log::warn;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "BEATMAKER_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "BEATMAKER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BEATMAKER_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "beatmaker.sqlite3";

/// Effective runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Normalized log level (`trace|debug|info|warn|error`).
    pub log_level: &'static str,
    /// Absolute log directory; file logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

/// One partially-specified configuration source, as read from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl ConfigLayer {
    /// Applies set fields on top of `config`.
    pub fn apply_to(self, config: &mut AppConfig) -> Result<(), ConfigError> {
        if let Some(db_path) = self.db_path {
            config.db_path = db_path;
        }
        if let Some(level) = self.log_level {
            config.log_level = normalize_level(&level).map_err(ConfigError::Invalid)?;
        }
        if let Some(log_dir) = self.log_dir {
            if !log_dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    log_dir.display()
                )));
            }
            config.log_dir = Some(log_dir);
        }
        Ok(())
    }
}

/// Configuration load errors.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Loads configuration from an optional file plus process environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::default();
    if let Some(path) = path {
        if let Some(layer) = read_config_file(path)? {
            layer.apply_to(&mut config)?;
        }
    }
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Reads one TOML layer; returns `None` when the file does not exist.
pub fn read_config_file(path: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Applies `BEATMAKER_*` overrides read through `lookup`.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(raw) = lookup(ENV_DB_PATH) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.db_path = PathBuf::from(trimmed);
        }
    }

    if let Some(raw) = lookup(ENV_LOG_LEVEL) {
        match normalize_level(&raw) {
            Ok(level) => config.log_level = level,
            Err(err) => warn!("invalid {ENV_LOG_LEVEL}, ignoring: {err}"),
        }
    }

    if let Some(raw) = lookup(ENV_LOG_DIR) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            // explicit empty value disables file logging
            config.log_dir = None;
        } else if Path::new(trimmed).is_absolute() {
            config.log_dir = Some(PathBuf::from(trimmed));
        } else {
            warn!("invalid {ENV_LOG_DIR}, ignoring: `{trimmed}` is not absolute");
        }
    }
}
