//! `aclctl` configuration.
//!
//! # Load order
//!
//! 1. Built-in defaults
//! 2. Config file: `--config`, else `ACLCTL_CONFIG`, else
//!    `<config dir>/aclctl/config.toml`
//! 3. Environment overrides (`ACLCTL_DATABASE_PATH`, `ACLCTL_LOG_LEVEL`)
//!
//! A missing default file means defaults; a missing file that was named
//! explicitly is an error.

use acl_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Binary and config directory name.
pub const PROJECT_NAME: &str = "aclctl";

/// Env var naming the config file.
pub const ENV_CONFIG: &str = "ACLCTL_CONFIG";

/// Env var overriding `database.path`.
pub const ENV_DATABASE_PATH: &str = "ACLCTL_DATABASE_PATH";

/// Env var overriding `logging.level`.
pub const ENV_LOG_LEVEL: &str = "ACLCTL_LOG_LEVEL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Where grants and objects are stored
    pub database: DatabaseConfig,
    /// Log output
    pub logging: LoggingConfig,
}

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// redb file path
    pub path: PathBuf,
    /// Use a throwaway in-memory database instead of `path`
    pub in_memory: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            in_memory: false,
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(PROJECT_NAME).join("acl.redb"))
        .unwrap_or_else(|| PathBuf::from("acl.redb"))
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AclConfig {
    /// `<config dir>/aclctl/config.toml`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(PROJECT_NAME).join("config.toml"))
    }

    /// The config file that would be read for `explicit`.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        Self::resolve_config_path_with(explicit, env_var)
    }

    /// [`resolve_config_path`](Self::resolve_config_path) with a custom
    /// environment lookup.
    pub fn resolve_config_path_with<F>(explicit: Option<&str>, env: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        explicit
            .map(PathBuf::from)
            .or_else(|| env(ENV_CONFIG).map(PathBuf::from))
            .or_else(Self::default_config_path)
    }

    /// Load configuration from the process environment.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        Self::load_with(explicit, env_var)
    }

    /// Load configuration, reading environment variables through `env`.
    pub fn load_with<F>(explicit: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let named = explicit.is_some() || env(ENV_CONFIG).is_some();
        let mut config = match Self::resolve_config_path_with(explicit, &env) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) if named => {
                return Err(Error::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            _ => Self::default(),
        };
        config.apply_env_overrides(env);
        Ok(config)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = env(ENV_DATABASE_PATH) {
            self.database.path = PathBuf::from(path);
        }
        if let Some(level) = env(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
