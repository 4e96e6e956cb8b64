//! Task and note model types for the habit tracker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of past reset cycles kept in a task's history window.
pub const HISTORY_LEN: usize = 7;

/// History value recorded for a day the task was completed.
pub const DONE_MARK: u8 = 10;

/// Calendar-day format used for `last_reset` and note dates.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar day.
#[must_use]
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DAY_FORMAT).ok()
}

/// Format a calendar day as `YYYY-MM-DD`.
#[must_use]
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Today's state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not yet marked today.
    #[default]
    Pending,
    /// Completed today.
    Done,
    /// Explicitly missed today.
    Missed,
}

impl Status {
    /// Parse a status from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid status.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidStatus> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            "missed" => Ok(Self::Missed),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }

    /// Get the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Missed => "missed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid status string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl std::fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid status: '{}' (must be one of: pending, done, missed)", self.0)
    }
}

impl std::error::Error for InvalidStatus {}

/// Rolling record of the last [`HISTORY_LEN`] reset cycles, oldest first.
///
/// Each slot is either `0` (not done) or [`DONE_MARK`]. The fixed-size array
/// keeps the window length constant no matter how many cycles are pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History([u8; HISTORY_LEN]);

impl History {
    /// Build a history from raw slot values. Any positive value counts as done.
    #[must_use]
    pub fn new(days: [u8; HISTORY_LEN]) -> Self {
        Self(days.map(|d| if d > 0 { DONE_MARK } else { 0 }))
    }

    /// The slot values, oldest first.
    #[must_use]
    pub const fn days(&self) -> &[u8; HISTORY_LEN] {
        &self.0
    }

    /// Drop the oldest slot and append one for the cycle that just ended.
    pub fn push(&mut self, done: bool) {
        self.0.rotate_left(1);
        self.0[HISTORY_LEN - 1] = if done { DONE_MARK } else { 0 };
    }

    /// Number of completed cycles in the window.
    #[must_use]
    pub fn completed_days(&self) -> usize {
        self.0.iter().filter(|&&d| d > 0).count()
    }

    /// Decode the stored text form (a JSON integer array).
    ///
    /// Malformed text decodes to an empty window. Longer arrays keep their
    /// newest entries and shorter ones are left-padded with zeros.
    #[must_use]
    pub fn decode(stored: &str) -> Self {
        let values: Vec<i64> = serde_json::from_str(stored).unwrap_or_default();
        let mut days = [0u8; HISTORY_LEN];
        let skip = values.len().saturating_sub(HISTORY_LEN);
        let offset = HISTORY_LEN - (values.len() - skip);
        for (slot, value) in days[offset..].iter_mut().zip(values.iter().skip(skip)) {
            *slot = if *value > 0 { DONE_MARK } else { 0 };
        }
        Self(days)
    }

    /// Encode to the stored text form.
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[0,0,0,0,0,0,0]".to_string())
    }
}

/// A recurring habit tracked with a daily status and a streak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Today's status.
    pub status: Status,
    /// Consecutive completed days.
    pub streak: u32,
    /// Display color (any CSS color expression).
    pub color: String,
    /// Completion record of the previous cycles, not including today.
    pub history: History,
    /// Day the daily reset last ran for this task. `None` means never.
    pub last_reset: Option<NaiveDate>,
    /// Timestamp when the task was created.
    pub created_at: String,
}

impl Task {
    /// Whether the task has been completed today.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }
}

/// Free-text reflection stored for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Day the note belongs to.
    pub date: NaiveDate,
    /// Note text. Empty when nothing was written for the day.
    pub content: String,
    /// Last write timestamp, `None` if the note was never saved.
    pub updated_at: Option<String>,
}

impl Note {
    /// The placeholder returned for a day with no saved note.
    #[must_use]
    pub const fn empty(date: NaiveDate) -> Self {
        Self { date, content: String::new(), updated_at: None }
    }
}
