//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/marcapagina/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/marcapagina/` (~/.config/marcapagina/)
//! - Data: `$XDG_DATA_HOME/marcapagina/` (~/.local/share/marcapagina/)
//! - State/Logs: `$XDG_STATE_HOME/marcapagina/` (~/.local/state/marcapagina/)

use crate::clock::Clock;
use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "marcapagina";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Calendar / timezone configuration
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Storage overrides
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Which UTC offset "today" is computed in
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CalendarConfig {
    /// Fixed offset such as "-03:00"; the machine's local offset when unset
    pub utc_offset: Option<String>,
}

impl CalendarConfig {
    /// Parsed offset, if one is configured
    pub fn offset(&self) -> Result<Option<FixedOffset>> {
        self.utc_offset.as_deref().map(parse_utc_offset).transpose()
    }

    /// A clock for the current instant in the configured offset
    pub fn clock(&self) -> Result<Clock> {
        Ok(match self.offset()? {
            Some(offset) => Clock::with_offset(offset),
            None => Clock::system(),
        })
    }
}

/// Parse an RFC 3339 offset ("-03:00", "Z"), plus "UTC" and the hour-only "+HH".
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let s = raw.trim();
    let offset = if s.eq_ignore_ascii_case("utc") {
        "Z".to_string()
    } else if s.len() == 3 && s.starts_with(&['+', '-'][..]) {
        format!("{}:00", s)
    } else {
        s.to_string()
    };

    DateTime::parse_from_rfc3339(&format!("2000-01-01T00:00:00{}", offset))
        .map(|dt| *dt.offset())
        .map_err(|e| Error::Config(format!("invalid calendar.utc_offset {:?}: {}", raw, e)))
}

/// Storage configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct StorageConfig {
    /// Override for the SQLite database file
    pub database_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        // Surface a bad offset at load time rather than on first use
        config.calendar.offset()?;

        Ok(config)
    }

    /// Clock for "now" honouring `calendar.utc_offset`
    pub fn clock(&self) -> Result<Clock> {
        self.calendar.clock()
    }

    /// Database file to open: `storage.database_path` or the XDG default
    pub fn resolved_database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(Self::database_path)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/marcapagina/config.toml` (~/.config/marcapagina/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join(APP_DIR).join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/marcapagina/` (~/.local/share/marcapagina/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join(APP_DIR)
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/marcapagina/` (~/.local/state/marcapagina/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join(APP_DIR)
    }

    /// Returns the default database file path
    ///
    /// `$XDG_DATA_HOME/marcapagina/data.db` (~/.local/share/marcapagina/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/marcapagina/marcapagina.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("marcapagina.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.max_files, 5);
        assert!(config.calendar.utc_offset.is_none());
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[logging]
level = "debug"

[calendar]
utc_offset = "-03:00"

[storage]
database_path = "/tmp/livros.db"
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.max_files, 5);
        assert_eq!(
            config.calendar.offset().unwrap(),
            FixedOffset::west_opt(3 * 3600)
        );
        assert_eq!(
            config.resolved_database_path(),
            PathBuf::from("/tmp/livros.db")
        );
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 19800);
        assert_eq!(parse_utc_offset("-03:00").unwrap().local_minus_utc(), -10800);
        assert_eq!(parse_utc_offset("+09").unwrap().local_minus_utc(), 32400);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("utc").unwrap().local_minus_utc(), 0);

        for bad in ["03:00", "+3", "+03:75", "+24:00", "-03:00 extra", "brasilia", ""] {
            assert!(
                matches!(parse_utc_offset(bad), Err(Error::Config(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_load_rejects_bad_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[calendar]\nutc_offset = \"later\"\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_clock_uses_configured_offset() {
        let calendar = CalendarConfig {
            utc_offset: Some("+02:00".to_string()),
        };
        let clock = calendar.clock().unwrap();
        assert_eq!(clock.offset().local_minus_utc(), 7200);
    }
}
