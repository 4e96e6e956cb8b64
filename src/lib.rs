//! # `habit_tracker`
//!
//! Daily habit tracking with streaks, a rolling 7-day history, consistency
//! scores, and date-keyed notes, backed by `SQLite`.
//!
//! The [`service::HabitService`] is the entry point for every surface: the
//! CLI, the MCP server, and the HTTP API.

#[cfg(feature = "http")]
pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod paths;
pub mod service;
pub mod tasks;
pub mod templates;
pub mod traits;

pub use error::{Error, ErrorKind, Result};
pub use service::HabitService;
pub use traits::{Clock, FixedClock, SystemClock};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
