//! Status transitions a user triggers on a task during the day.

use crate::tasks::models::{Status, Task};
use serde::{Deserialize, Serialize};

/// A user action on today's status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Mark the task done and extend the streak.
    Complete,
    /// Mark the task missed and break the streak.
    Miss,
    /// Return the task to pending, taking back a completion.
    Undo,
}

impl Action {
    /// Parse an action from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid action.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidAction> {
        match s.to_lowercase().as_str() {
            "complete" | "done" => Ok(Self::Complete),
            "miss" | "missed" => Ok(Self::Miss),
            "undo" => Ok(Self::Undo),
            _ => Err(InvalidAction(s.to_string())),
        }
    }

    /// Get the string representation of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Miss => "miss",
            Self::Undo => "undo",
        }
    }
}

/// Error when an invalid action string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAction(pub String);

impl std::fmt::Display for InvalidAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid action: '{}' (must be one of: complete, miss, undo)", self.0)
    }
}

impl std::error::Error for InvalidAction {}

/// The status and streak to write after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// New status.
    pub status: Status,
    /// New streak.
    pub streak: u32,
}

/// Compute the write an action implies, or `None` if the action does not apply.
///
/// Completing or missing only applies to a pending task. Undo always applies
/// and only gives back a streak day when the task was done.
#[must_use]
pub fn transition(task: &Task, action: Action) -> Option<Progress> {
    match action {
        Action::Complete if task.status == Status::Pending => {
            Some(Progress { status: Status::Done, streak: task.streak.saturating_add(1) })
        }
        Action::Miss if task.status == Status::Pending => {
            Some(Progress { status: Status::Missed, streak: 0 })
        }
        Action::Complete | Action::Miss => None,
        Action::Undo => {
            let streak =
                if task.is_done() { task.streak.saturating_sub(1) } else { task.streak };
            Some(Progress { status: Status::Pending, streak })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::models::History;

    fn task(status: Status, streak: u32) -> Task {
        Task {
            id: 7,
            name: "Sunlight".to_string(),
            status,
            streak,
            color: "#fcd34d".to_string(),
            history: History::default(),
            last_reset: None,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_complete_pending() {
        let progress = transition(&task(Status::Pending, 3), Action::Complete).unwrap();
        assert_eq!(progress, Progress { status: Status::Done, streak: 4 });
    }

    #[test]
    fn test_miss_pending() {
        let progress = transition(&task(Status::Pending, 3), Action::Miss).unwrap();
        assert_eq!(progress, Progress { status: Status::Missed, streak: 0 });
    }

    #[test]
    fn test_complete_and_miss_only_from_pending() {
        assert_eq!(transition(&task(Status::Done, 3), Action::Complete), None);
        assert_eq!(transition(&task(Status::Done, 3), Action::Miss), None);
        assert_eq!(transition(&task(Status::Missed, 0), Action::Complete), None);
        assert_eq!(transition(&task(Status::Missed, 0), Action::Miss), None);
    }

    #[test]
    fn test_undo_done_gives_back_streak_day() {
        let progress = transition(&task(Status::Done, 4), Action::Undo).unwrap();
        assert_eq!(progress, Progress { status: Status::Pending, streak: 3 });
    }

    #[test]
    fn test_undo_floors_at_zero() {
        let progress = transition(&task(Status::Done, 0), Action::Undo).unwrap();
        assert_eq!(progress.streak, 0);
    }

    #[test]
    fn test_undo_missed_keeps_streak() {
        let progress = transition(&task(Status::Missed, 0), Action::Undo).unwrap();
        assert_eq!(progress, Progress { status: Status::Pending, streak: 0 });
    }

    #[test]
    fn test_parse_action() {
        assert_eq!(Action::from_str("complete").unwrap(), Action::Complete);
        assert_eq!(Action::from_str("Done").unwrap(), Action::Complete);
        assert_eq!(Action::from_str("miss").unwrap(), Action::Miss);
        assert_eq!(Action::from_str("undo").unwrap(), Action::Undo);
        assert!(Action::from_str("skip").unwrap_err().to_string().contains("complete, miss, undo"));
    }
}
