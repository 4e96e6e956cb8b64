//! Logging setup shared by the binaries.
//!
//! Events are emitted with `tracing` and written either to stderr or to a
//! log file. The MCP server must keep stdout clean, so it always logs to
//! the file. The filter comes from `HABIT_TRACKER_LOG` (default `info`).

use crate::error::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::panic;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "HABIT_TRACKER_LOG";

/// Maximum log file size before rotation (1MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Where log output goes.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    /// Standard error.
    Stderr,
    /// An append-only file, rotated when it grows too large.
    File(&'a Path),
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global
/// subscriber is already installed.
pub fn init(target: LogTarget<'_>) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter()).with_target(false);

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
    };
    installed.map_err(|e| Error::Config(format!("logging already initialized: {e}")))?;

    tracing::info!(version = crate::VERSION, "logging initialized");
    Ok(())
}

/// Open the log file for appending, rotating it first if it is too large.
///
/// # Errors
///
/// Returns an error if the file or its directory cannot be created.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Ok(metadata) = fs::metadata(path) {
        if metadata.len() > MAX_LOG_SIZE {
            let backup = path.with_extension("log.old");
            let _ = fs::rename(path, backup);
        }
    }

    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install a panic hook that logs panics before running the previous hook.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let location = info.location().map_or_else(
            || "unknown".to_string(),
            |loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()),
        );
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        tracing::error!(%location, "panic: {payload}");

        original_hook(info);
    }));
}

/// A guard that logs how long an operation took when dropped.
///
/// ```ignore
/// let mut guard = OperationGuard::new("create_habit");
/// // ... run the operation, calling guard.mark_error() on failure ...
/// ```
pub struct OperationGuard {
    name: &'static str,
    start: Instant,
    success: bool,
}

impl OperationGuard {
    /// Start timing an operation.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        tracing::debug!(operation = name, "start");
        Self { name, start: Instant::now(), success: true }
    }

    /// Mark the operation as failed.
    pub fn mark_error(&mut self) {
        self.success = false;
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        let elapsed_ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        if self.success {
            tracing::info!(operation = self.name, elapsed_ms, "ok");
        } else {
            tracing::warn!(operation = self.name, elapsed_ms, "failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_file_and_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("habits.log");

        open_log_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_rotates_large_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("habits.log");
        let size = usize::try_from(MAX_LOG_SIZE).unwrap() + 1;
        fs::write(&path, vec![b'x'; size]).unwrap();

        open_log_file(&path).unwrap();

        assert!(dir.path().join("habits.log.old").exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_open_keeps_small_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("habits.log");
        fs::write(&path, "earlier line\n").unwrap();

        open_log_file(&path).unwrap();

        assert!(!dir.path().join("habits.log.old").exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier line\n");
    }

    #[test]
    fn test_operation_guard_without_subscriber() {
        let mut guard = OperationGuard::new("list_habits");
        guard.mark_error();
        drop(guard);
    }
}
