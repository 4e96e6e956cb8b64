//! Habit operations shared by the HTTP API, the MCP server, and the CLI.
//!
//! The service validates requests before they reach the store and runs the
//! daily reset on every task it hands out.

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::tasks::{
    apply_daily_reset, parse_day, transition, Action, DailySummary, HabitStore, Note,
    ResetOutcome, SqliteHabitStore, Status, Task, TaskConsistency, TaskUpdate,
};
use crate::traits::{Clock, SystemClock};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request to create a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    /// Task name (required, non-empty).
    pub name: Option<String>,
    /// Display color. Falls back to the configured default.
    pub color: Option<String>,
}

/// Request to update a task: either `name`, or `status` together with `streak`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    /// Task ID (required).
    pub id: Option<i64>,
    /// New name.
    pub name: Option<String>,
    /// New status: pending, done, or missed.
    pub status: Option<String>,
    /// New streak.
    pub streak: Option<i64>,
}

/// Request to save the note for a day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteInput {
    /// Day as `YYYY-MM-DD` (required).
    pub date: Option<String>,
    /// Note text. Missing means empty.
    pub content: Option<String>,
}

/// Today's dashboard figures plus per-task consistency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Day the figures were computed for.
    pub date: NaiveDate,
    /// Aggregate figures.
    #[serde(flatten)]
    pub summary: DailySummary,
    /// One row per task, in list order.
    pub tasks: Vec<TaskConsistency>,
}

/// Habit operations over a store and a clock.
#[derive(Clone)]
pub struct HabitService {
    store: Arc<dyn HabitStore>,
    clock: Arc<dyn Clock>,
    config: AppConfig,
}

impl HabitService {
    /// Create a service from its parts.
    pub fn new(store: Arc<dyn HabitStore>, clock: Arc<dyn Clock>, config: AppConfig) -> Self {
        Self { store, clock, config }
    }

    /// Open the configured `SQLite` database with the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the database path cannot be resolved or opened.
    pub fn open(config: AppConfig) -> Result<Self> {
        let db_path = config.database_path()?;
        let store = SqliteHabitStore::new(&db_path)?;
        tracing::debug!(path = %db_path.display(), "opened habit database");
        Ok(Self::new(Arc::new(store), Arc::new(SystemClock::new()), config))
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The current day according to the service clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// List all tasks, applying the daily reset to each.
    ///
    /// A task whose reset cannot be persisted is still returned in its reset
    /// form; the store keeps the old day so the next read tries again.
    ///
    /// # Errors
    ///
    /// Returns an error if the task list cannot be read.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let today = self.today();
        let tasks = self.store.list_tasks()?;
        Ok(tasks.into_iter().filter_map(|task| self.normalize(task, today)).collect())
    }

    /// Get one task, applying the daily reset.
    ///
    /// # Errors
    ///
    /// Returns `TaskNotFound` if the task does not exist, or a store error.
    pub fn get_task(&self, id: i64) -> Result<Task> {
        let task = self.store.get_task(id)?.ok_or(Error::TaskNotFound(id))?;
        self.normalize(task, self.today()).ok_or(Error::TaskNotFound(id))
    }

    /// Reset a task for `today` and persist the result, best effort.
    ///
    /// Returns `None` only if the task disappeared while it was being reset.
    fn normalize(&self, task: Task, today: NaiveDate) -> Option<Task> {
        let ResetOutcome { task, needs_write, previous_reset } =
            apply_daily_reset(task, today, self.config.gap_policy);
        if !needs_write {
            return Some(task);
        }

        match self.store.save_reset(&task, previous_reset) {
            Ok(true) => {
                tracing::debug!(task_id = task.id, %today, "daily reset applied");
                Some(task)
            }
            // Another reader reset the row first, or it was deleted
            Ok(false) => match self.store.get_task(task.id) {
                Ok(current) => current,
                Err(e) => {
                    tracing::warn!(task_id = task.id, error = %e, "failed to re-read reset task");
                    Some(task)
                }
            },
            Err(e) => {
                tracing::warn!(
                    task_id = task.id,
                    error = %e,
                    "failed to persist daily reset, retrying on next read"
                );
                Some(task)
            }
        }
    }

    /// Create a task.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the name is missing or blank, or a store error.
    pub fn create_task(&self, input: &NewTask) -> Result<Task> {
        let name = required_name(input.name.as_deref())?;
        let color = input
            .color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.config.default_color);

        let task = self.store.create_task(&name, color, self.today())?;
        tracing::info!(task_id = task.id, name = %task.name, "task created");
        Ok(task)
    }

    /// Apply a rename or an explicit status/streak write.
    ///
    /// When the patch carries a name, only the name changes. The task is
    /// brought up to today before the write, so the write always lands on
    /// today's cycle.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a malformed patch, `TaskNotFound` for an
    /// unknown ID, or a store error.
    pub fn update_task(&self, patch: &TaskPatch) -> Result<Task> {
        let id = patch.id.ok_or_else(|| Error::invalid("Task ID required"))?;

        let update = match (&patch.name, &patch.status, patch.streak) {
            (Some(name), _, _) => TaskUpdate::Rename(required_name(Some(name))?),
            (None, Some(status), Some(streak)) => TaskUpdate::Progress {
                status: Status::from_str(status).map_err(|e| Error::invalid(e.to_string()))?,
                streak: u32::try_from(streak)
                    .map_err(|_| Error::invalid("streak must be a non-negative integer"))?,
            },
            _ => return Err(Error::invalid("Invalid update payload")),
        };

        self.get_task(id)?;
        let task = self.store.update_task(id, &update)?.ok_or(Error::TaskNotFound(id))?;
        tracing::info!(task_id = id, update = ?update, "task updated");
        Ok(task)
    }

    /// Complete, miss, or undo today's status of a task.
    ///
    /// Completing or missing a task that is not pending leaves it unchanged.
    ///
    /// # Errors
    ///
    /// Returns `TaskNotFound` for an unknown ID, or a store error.
    pub fn apply_action(&self, id: i64, action: Action) -> Result<Task> {
        let task = self.get_task(id)?;
        let Some(progress) = transition(&task, action) else {
            tracing::debug!(
                task_id = id,
                action = action.as_str(),
                status = %task.status,
                "action ignored"
            );
            return Ok(task);
        };

        let update = TaskUpdate::Progress { status: progress.status, streak: progress.streak };
        let task = self.store.update_task(id, &update)?.ok_or(Error::TaskNotFound(id))?;
        tracing::info!(
            task_id = id,
            action = action.as_str(),
            streak = task.streak,
            "action applied"
        );
        Ok(task)
    }

    /// Delete a task.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` without an ID, `TaskNotFound` for an unknown ID,
    /// or a store error.
    pub fn delete_task(&self, id: Option<i64>) -> Result<()> {
        let id = id.ok_or_else(|| Error::invalid("Task ID required"))?;
        if !self.store.delete_task(id)? {
            return Err(Error::TaskNotFound(id));
        }
        tracing::info!(task_id = id, "task deleted");
        Ok(())
    }

    /// Get the note for a day. A day without a note yields empty content.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a missing or malformed date, or a store error.
    pub fn get_note(&self, date: Option<&str>) -> Result<Note> {
        let date = required_date(date)?;
        Ok(self.store.get_note(date)?.unwrap_or_else(|| Note::empty(date)))
    }

    /// Save the note for a day, replacing any earlier content.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a missing or malformed date, or a store error.
    pub fn save_note(&self, input: &NoteInput) -> Result<Note> {
        let date = required_date(input.date.as_deref())?;
        let note = self.store.upsert_note(date, input.content.as_deref().unwrap_or_default())?;
        tracing::info!(%date, bytes = note.content.len(), "note saved");
        Ok(note)
    }

    /// Compute today's dashboard figures.
    ///
    /// # Errors
    ///
    /// Returns an error if the task list cannot be read.
    pub fn stats(&self) -> Result<Stats> {
        let tasks = self.list_tasks()?;
        Ok(Stats {
            date: self.today(),
            summary: DailySummary::from_tasks(&tasks),
            tasks: tasks.iter().map(TaskConsistency::from_task).collect(),
        })
    }

    /// Seed the configured default habits into an empty database.
    ///
    /// Returns the number of tasks created (zero when tasks already exist).
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn setup(&self) -> Result<usize> {
        if self.store.count_tasks()? > 0 {
            return Ok(0);
        }

        let today = self.today();
        for seed in &self.config.seed_habits {
            self.store.create_task(&seed.name, &seed.color, today)?;
        }
        tracing::info!(count = self.config.seed_habits.len(), "seeded default habits");
        Ok(self.config.seed_habits.len())
    }
}

/// Validate a task name, returning it trimmed.
fn required_name(name: Option<&str>) -> Result<String> {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(Error::invalid("Task name is required")),
    }
}

/// Validate a `YYYY-MM-DD` date.
fn required_date(date: Option<&str>) -> Result<NaiveDate> {
    let date = date.map(str::trim).filter(|d| !d.is_empty());
    let date = date.ok_or_else(|| Error::invalid("Date is required"))?;
    parse_day(date)
        .ok_or_else(|| Error::invalid(format!("invalid date '{date}' (expected YYYY-MM-DD)")))
}
