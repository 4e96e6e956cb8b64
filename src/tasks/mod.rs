//! Habit tracking core.
//!
//! This module provides:
//! - Tasks with a daily status, a streak, and a 7-day completion history
//! - The daily reset that rolls each task into a new day
//! - Consistency, completion, and streak analytics
//! - Date-keyed notes
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use habit_tracker::tasks::{apply_daily_reset, GapPolicy, HabitStore, SqliteHabitStore};
//!
//! let store = SqliteHabitStore::new("/tmp/habits.sqlite3").unwrap();
//! let today = NaiveDate::from_ymd_opt(2026, 2, 21).unwrap();
//!
//! let task = store.create_task("Meditation", "var(--accent-cyan)", today).unwrap();
//! let tomorrow = today.succ_opt().unwrap();
//! let outcome = apply_daily_reset(task, tomorrow, GapPolicy::Single);
//! assert!(outcome.needs_write);
//! ```

pub mod actions;
pub mod analytics;
pub mod models;
pub mod reset;
pub mod store;

pub use actions::{transition, Action, InvalidAction, Progress};
pub use analytics::{
    completion_rate, consistency_score, sparkline, top_streak, top_streak_task, DailySummary,
    TaskConsistency,
};
pub use models::{
    format_day, parse_day, History, InvalidStatus, Note, Status, Task, DONE_MARK, HISTORY_LEN,
};
pub use reset::{apply_daily_reset, GapPolicy, ResetOutcome};
pub use store::{HabitStore, SqliteHabitStore, TaskUpdate};
