//! Configuration management for the habit tracker.
//!
//! Settings live in `~/.habit-tracker/config.yaml`. The file is optional and
//! every field has a default, so a missing file means default behavior.

use crate::error::{Error, Result};
use crate::paths;
use crate::tasks::GapPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "HABIT_TRACKER_CONFIG";

/// Environment variable overriding the database location.
pub const DB_ENV: &str = "HABIT_TRACKER_DB";

/// Color given to new tasks when the request does not name one.
pub const DEFAULT_COLOR: &str = "var(--accent-pink)";

/// Address the HTTP API listens on by default.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// A habit created by `setup` when the task list is empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedHabit {
    /// Task name.
    pub name: String,
    /// Display color.
    pub color: String,
}

impl SeedHabit {
    fn new(name: &str, color: &str) -> Self {
        Self { name: name.to_string(), color: color.to_string() }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Database file. None means `~/.habit-tracker/habits.sqlite3`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Color for tasks created without one.
    pub default_color: String,

    /// How a reset treats several days without a read.
    pub gap_policy: GapPolicy,

    /// Address for the HTTP API.
    pub listen_addr: String,

    /// Habits seeded into an empty database by `setup`.
    pub seed_habits: Vec<SeedHabit>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            default_color: DEFAULT_COLOR.to_string(),
            gap_policy: GapPolicy::default(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            seed_habits: vec![
                SeedHabit::new("Wake up early", "var(--accent-cyan)"),
                SeedHabit::new("Drink water", "var(--accent-cyan)"),
                SeedHabit::new("Sunlight", "#fcd34d"),
                SeedHabit::new("Stretching", "var(--accent-violet)"),
                SeedHabit::new("Meditation", "var(--accent-cyan)"),
                SeedHabit::new("Read for self improvement", "var(--accent-pink)"),
                SeedHabit::new("Healthy breakfast", "var(--accent-cyan)"),
            ],
        }
    }
}

impl AppConfig {
    /// Load config from the environment override or the default location.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => paths::default_config_path(),
        };
        match path {
            Some(path) => Ok(Self::load_from(&path)?.unwrap_or_default()),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a specific file, returning None if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(config_path: &Path) -> Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Save config to a specific file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    #[cfg(test)]
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Resolve the database path: `HABIT_TRACKER_DB`, then the config, then
    /// the default data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no location can be determined.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(DB_ENV) {
            return Ok(PathBuf::from(path));
        }
        if let Some(ref path) = self.database_path {
            return Ok(path.clone());
        }
        paths::default_db_path()
            .ok_or_else(|| Error::Config("cannot determine home directory".to_string()))
    }

    /// Parse the configured listen address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not a valid socket address.
    pub fn listen_addr(&self) -> Result<std::net::SocketAddr> {
        self.listen_addr
            .parse()
            .map_err(|e| Error::Config(format!("invalid listen_addr '{}': {e}", self.listen_addr)))
    }
}
