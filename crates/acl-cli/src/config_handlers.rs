//! Handlers for `aclctl config` subcommands.

use crate::cli::ConfigAction;
use crate::config::{AclConfig, PROJECT_NAME};
use acl_core::{Error, Result};
use std::io::Write;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Run an `aclctl config` action.
pub fn handle_config_command<W: Write>(
    config_path: Option<&str>,
    action: ConfigAction,
    out: &mut W,
) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path, out),
        ConfigAction::Show => cmd_config_show(config_path, out),
        ConfigAction::Get { key } => cmd_config_get(config_path, &key, out),
        ConfigAction::Set { key, value } => cmd_config_set(config_path, &key, &value, out),
        ConfigAction::Init { file, force } => cmd_config_init(file.as_deref(), force, out),
    }
}

/// Print the resolved config file path.
pub fn cmd_config_path<W: Write>(config_path: Option<&str>, out: &mut W) -> Result<()> {
    let path = AclConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    writeln!(out, "{}", path.display())?;
    if !path.exists() {
        log::warn!("Config file does not exist; run `{PROJECT_NAME} config init` to create it");
    }
    Ok(())
}

/// Print the effective configuration, environment overrides applied.
pub fn cmd_config_show<W: Write>(config_path: Option<&str>, out: &mut W) -> Result<()> {
    let config = AclConfig::load(config_path)?;
    write!(out, "{}", config.to_toml_string()?)?;
    Ok(())
}

/// Print one configuration value by dotted key.
pub fn cmd_config_get<W: Write>(config_path: Option<&str>, key: &str, out: &mut W) -> Result<()> {
    let key: ConfigKey = key.parse()?;
    let config = AclConfig::load(config_path)?;
    writeln!(out, "{}", key.get(&config))?;
    Ok(())
}

/// Set one value by dotted key in an existing config file.
///
/// Only the file's own values are written back; environment overrides are
/// not baked in.
pub fn cmd_config_set<W: Write>(
    config_path: Option<&str>,
    key: &str,
    value: &str,
    out: &mut W,
) -> Result<()> {
    let path = AclConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `{PROJECT_NAME} config init` first.",
            path.display()
        )));
    }

    let parsed: ConfigKey = key.parse()?;
    let mut config = AclConfig::from_file(&path)?;
    parsed.set(&mut config, value)?;
    std::fs::write(&path, config.to_toml_string()?).map_err(|e| Error::io_with_path(e, &path))?;

    writeln!(out, "Set {key} = {value} in {}", path.display())?;
    Ok(())
}

/// Write a default configuration file.
pub fn cmd_config_init<W: Write>(file: Option<&str>, force: bool, out: &mut W) -> Result<()> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => AclConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    let rendered = AclConfig::default().to_toml_string()?;
    std::fs::write(&path, rendered).map_err(|e| Error::io_with_path(e, &path))?;

    writeln!(out, "Config file created at {}", path.display())?;
    Ok(())
}

// ============================================================================
// Settable keys
// ============================================================================

/// A dotted configuration key accepted by `config get` and `config set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    /// `database.path`
    DatabasePath,
    /// `database.in_memory`
    DatabaseInMemory,
    /// `logging.level`
    LoggingLevel,
}

impl ConfigKey {
    /// Every key, in display order.
    pub const ALL: [ConfigKey; 3] = [
        ConfigKey::DatabasePath,
        ConfigKey::DatabaseInMemory,
        ConfigKey::LoggingLevel,
    ];

    /// The dotted form, e.g. `database.path`.
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::DatabasePath => "database.path",
            ConfigKey::DatabaseInMemory => "database.in_memory",
            ConfigKey::LoggingLevel => "logging.level",
        }
    }

    /// Current value rendered for display.
    pub fn get(self, config: &AclConfig) -> String {
        match self {
            ConfigKey::DatabasePath => config.database.path.display().to_string(),
            ConfigKey::DatabaseInMemory => config.database.in_memory.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
        }
    }

    /// Parse `value` for this key and store it.
    pub fn set(self, config: &mut AclConfig, value: &str) -> Result<()> {
        match self {
            ConfigKey::DatabasePath => {
                if value.trim().is_empty() {
                    return Err(Error::config("Invalid value for 'database.path': empty path"));
                }
                config.database.path = PathBuf::from(value);
            }
            ConfigKey::DatabaseInMemory => {
                config.database.in_memory = value.parse().map_err(|_| {
                    Error::config(format!(
                        "Invalid value for 'database.in_memory': expected true or false, got '{value}'"
                    ))
                })?;
            }
            ConfigKey::LoggingLevel => {
                tracing_subscriber::EnvFilter::try_new(value).map_err(|e| {
                    Error::config(format!("Invalid value for 'logging.level': {e}"))
                })?;
                config.logging.level = value.to_string();
            }
        }
        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                Error::config(format!(
                    "Key '{s}' not found in configuration (known keys: {})",
                    known.join(", ")
                ))
            })
    }
}
