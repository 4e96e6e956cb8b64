//! Daily reset of task state.
//!
//! On the first read of a new calendar day, each task rolls today's status
//! into its history window, returns to `pending`, and keeps its streak only
//! if it was completed. The reset is a pure function of the stored task and
//! the current day, so it can be retried freely until the write sticks.

use crate::tasks::models::{Status, Task, HISTORY_LEN};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a reset treats more than one elapsed day since the previous reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Shift the history exactly once, whatever the gap.
    #[default]
    Single,
    /// Shift once per elapsed day, recording skipped days as not done.
    Backfill,
}

/// Result of running the reset against one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    /// The task as it should look today.
    pub task: Task,
    /// Whether the task changed and must be persisted.
    pub needs_write: bool,
    /// The `last_reset` the task was read with, for the conditional write.
    pub previous_reset: Option<NaiveDate>,
}

/// Bring a task's state up to `today`.
///
/// A task already reset today is returned untouched.
#[must_use]
pub fn apply_daily_reset(task: Task, today: NaiveDate, policy: GapPolicy) -> ResetOutcome {
    if task.last_reset == Some(today) {
        let previous_reset = task.last_reset;
        return ResetOutcome { task, needs_write: false, previous_reset };
    }

    let previous_reset = task.last_reset;
    let was_done = task.status == Status::Done;
    let skipped = match policy {
        GapPolicy::Single => 0,
        GapPolicy::Backfill => elapsed_days(task.last_reset, today).saturating_sub(1),
    };

    let mut task = task;
    task.history.push(was_done);
    for _ in 0..skipped.min(HISTORY_LEN) {
        task.history.push(false);
    }
    if !was_done || skipped > 0 {
        task.streak = 0;
    }
    task.status = Status::Pending;
    task.last_reset = Some(today);

    ResetOutcome { task, needs_write: true, previous_reset }
}

/// Days between the last reset and today, or 1 when that is not meaningful.
fn elapsed_days(last_reset: Option<NaiveDate>, today: NaiveDate) -> usize {
    match last_reset {
        Some(last) if last < today => usize::try_from((today - last).num_days()).unwrap_or(1),
        _ => 1,
    }
}
