//! Consistency, completion, and streak figures derived from task state.

use crate::tasks::models::{Task, DONE_MARK, HISTORY_LEN};
use serde::Serialize;

/// Label shown for the top streak when there are no tasks.
pub const NO_TOP_STREAK_TASK: &str = "Any Routine";

/// Slots in a sparkline: the history window plus today.
pub const SPARKLINE_LEN: usize = HISTORY_LEN + 1;

/// Round `part / whole` to a whole percentage, halves rounding up.
fn round_percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let pct = (200 * part + whole) / (2 * whole);
    u8::try_from(pct.min(100)).unwrap_or(100)
}

/// Share of the last [`SPARKLINE_LEN`] days (history plus today) completed.
#[must_use]
pub fn consistency_score(task: &Task) -> u8 {
    let hits = task.history.completed_days() + usize::from(task.is_done());
    round_percent(hits, SPARKLINE_LEN)
}

/// Percentage of tasks completed today. Zero for an empty list.
#[must_use]
pub fn completion_rate(tasks: &[Task]) -> u8 {
    let done = tasks.iter().filter(|t| t.is_done()).count();
    round_percent(done, tasks.len())
}

/// Longest current streak across tasks. Zero for an empty list.
#[must_use]
pub fn top_streak(tasks: &[Task]) -> u32 {
    tasks.iter().map(|t| t.streak).max().unwrap_or(0)
}

/// Name of the first task holding the top streak.
#[must_use]
pub fn top_streak_task(tasks: &[Task]) -> &str {
    let best = top_streak(tasks);
    tasks.iter().find(|t| t.streak == best).map_or(NO_TOP_STREAK_TASK, |t| t.name.as_str())
}

/// History window followed by today's value.
#[must_use]
pub fn sparkline(task: &Task) -> [u8; SPARKLINE_LEN] {
    let mut points = [0u8; SPARKLINE_LEN];
    points[..HISTORY_LEN].copy_from_slice(task.history.days());
    points[HISTORY_LEN] = if task.is_done() { DONE_MARK } else { 0 };
    points
}

/// Aggregate figures for today's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    /// Tasks completed today.
    pub completed: usize,
    /// Tasks not completed today (pending or missed).
    pub pending: usize,
    /// Total number of tasks.
    pub total: usize,
    /// Completed share as a percentage.
    pub completion_rate: u8,
    /// Longest current streak.
    pub top_streak: u32,
    /// Task holding the longest streak.
    pub top_streak_task: String,
}

impl DailySummary {
    /// Summarize a task list.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.is_done()).count();
        Self {
            completed,
            pending: tasks.len() - completed,
            total: tasks.len(),
            completion_rate: completion_rate(tasks),
            top_streak: top_streak(tasks),
            top_streak_task: top_streak_task(tasks).to_string(),
        }
    }
}

/// Per-task consistency row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskConsistency {
    /// Task ID.
    pub id: i64,
    /// Task name.
    pub name: String,
    /// Display color.
    pub color: String,
    /// Consistency percentage.
    pub score: u8,
    /// Sparkline points.
    pub sparkline: [u8; SPARKLINE_LEN],
}

impl TaskConsistency {
    /// Compute the row for a task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            color: task.color.clone(),
            score: consistency_score(task),
            sparkline: sparkline(task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::models::{History, Status};
    use proptest::prelude::*;

    fn task(name: &str, status: Status, streak: u32, history: [u8; HISTORY_LEN]) -> Task {
        Task {
            id: 1,
            name: name.to_string(),
            status,
            streak,
            color: "#fcd34d".to_string(),
            history: History::new(history),
            last_reset: None,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_consistency_bounds() {
        assert_eq!(consistency_score(&task("a", Status::Done, 0, [10; HISTORY_LEN])), 100);
        assert_eq!(consistency_score(&task("a", Status::Pending, 0, [0; HISTORY_LEN])), 0);
    }

    #[test]
    fn test_consistency_rounds_half_up() {
        // 1 of 8 = 12.5%
        assert_eq!(consistency_score(&task("a", Status::Done, 0, [0; HISTORY_LEN])), 13);
        // 3 of 8 = 37.5%
        let history = [0, 0, 0, 0, 10, 10, 0];
        assert_eq!(consistency_score(&task("a", Status::Done, 0, history)), 38);
        // 4 of 8
        let history = [10, 10, 10, 10, 0, 0, 0];
        assert_eq!(consistency_score(&task("a", Status::Missed, 0, history)), 50);
    }

    #[test]
    fn test_completion_rate() {
        assert_eq!(completion_rate(&[]), 0);
        let tasks = [
            task("a", Status::Done, 0, [0; HISTORY_LEN]),
            task("b", Status::Pending, 0, [0; HISTORY_LEN]),
        ];
        assert_eq!(completion_rate(&tasks), 50);

        let tasks = [
            task("a", Status::Done, 0, [0; HISTORY_LEN]),
            task("b", Status::Missed, 0, [0; HISTORY_LEN]),
            task("c", Status::Pending, 0, [0; HISTORY_LEN]),
        ];
        assert_eq!(completion_rate(&tasks), 33);
    }

    #[test]
    fn test_top_streak() {
        assert_eq!(top_streak(&[]), 0);
        assert_eq!(top_streak_task(&[]), NO_TOP_STREAK_TASK);

        let tasks = [
            task("Sunlight", Status::Done, 4, [0; HISTORY_LEN]),
            task("Reading", Status::Pending, 9, [0; HISTORY_LEN]),
            task("Walk", Status::Pending, 9, [0; HISTORY_LEN]),
        ];
        assert_eq!(top_streak(&tasks), 9);
        assert_eq!(top_streak_task(&tasks), "Reading");
    }

    #[test]
    fn test_sparkline_appends_today() {
        let history = [0, 10, 0, 10, 0, 10, 0];
        assert_eq!(sparkline(&task("a", Status::Done, 0, history)), [0, 10, 0, 10, 0, 10, 0, 10]);
        assert_eq!(sparkline(&task("a", Status::Missed, 0, history)), [0, 10, 0, 10, 0, 10, 0, 0]);
    }

    #[test]
    fn test_daily_summary() {
        let tasks = [
            task("Sunlight", Status::Done, 4, [0; HISTORY_LEN]),
            task("Reading", Status::Missed, 0, [0; HISTORY_LEN]),
        ];
        let summary = DailySummary::from_tasks(&tasks);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.completion_rate, 50);
        assert_eq!(summary.top_streak, 4);
        assert_eq!(summary.top_streak_task, "Sunlight");
    }

    proptest! {
        #[test]
        fn prop_consistency_in_range(
            history in prop::array::uniform7(0u8..=20),
            done in any::<bool>(),
        ) {
            let status = if done { Status::Done } else { Status::Pending };
            let score = consistency_score(&task("a", status, 0, history));
            prop_assert!(score <= 100);
        }

        #[test]
        fn prop_completion_rate_in_range(flags in prop::collection::vec(any::<bool>(), 0..50)) {
            let tasks: Vec<Task> = flags
                .iter()
                .map(|&d| if d { Status::Done } else { Status::Pending })
                .map(|status| task("a", status, 0, [0; HISTORY_LEN]))
                .collect();
            prop_assert!(completion_rate(&tasks) <= 100);
        }
    }
}
