//! Path utilities for determining data storage locations.
//!
//! Everything the tracker writes lives under `~/.habit-tracker/`: the
//! database, the optional config file, and the log.

use std::path::PathBuf;

/// The base directory name for habit-tracker data.
const DATA_DIR_NAME: &str = ".habit-tracker";

/// The database filename.
pub const DATABASE_FILENAME: &str = "habits.sqlite3";

/// The config filename.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// The log filename.
pub const LOG_FILENAME: &str = "habits.log";

/// Get the base data directory.
///
/// Returns `~/.habit-tracker/` or `None` if the home directory cannot be
/// determined.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// Get the default database path, `~/.habit-tracker/habits.sqlite3`.
#[must_use]
pub fn default_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(DATABASE_FILENAME))
}

/// Get the default config path, `~/.habit-tracker/config.yaml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Get the default log path, `~/.habit-tracker/habits.log`.
#[must_use]
pub fn default_log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(LOG_FILENAME))
}
