//! MCP server for habit tracking.
//!
//! Exposes the habit list, daily actions, notes, and statistics as tools over
//! the Model Context Protocol.

// The rmcp `#[tool(aggr)]` macro requires ownership of input structs,
// making pass-by-value necessary for all tool handler functions.
#![allow(clippy::needless_pass_by_value)]

use crate::config::AppConfig;
use crate::error::{Error, ErrorKind};
use crate::logging::OperationGuard;
use crate::service::{HabitService, NewTask, NoteInput, TaskPatch};
use crate::tasks::{format_day, Action};
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::tool;
use rmcp::Error as McpError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Instructions for the MCP server, shown to agents using this server.
const INSTRUCTIONS: &str = r"Daily habit tracker. Each habit has a status for today (pending, done, or missed), a streak of consecutive completed days, and a 7-day history.

Habits roll over to a new day automatically: the first read on a new day records yesterday in the history, resets the status to pending, and clears the streak unless yesterday was completed.

Use `complete_habit`, `miss_habit`, and `undo_habit` for day-to-day updates. Completing or missing a habit only applies while it is pending; undo returns it to pending. `set_habit_status` writes a status and streak directly.

Notes are free text keyed by date (YYYY-MM-DD); saving a note replaces the previous content for that day.";

/// MCP server for habit tracking.
#[derive(Clone)]
pub struct HabitsServer {
    service: HabitService,
}

impl HabitsServer {
    /// Create a server over an existing service.
    #[must_use]
    pub const fn new(service: HabitService) -> Self {
        Self { service }
    }

    /// Create a server using the configured database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn open(config: AppConfig) -> crate::error::Result<Self> {
        Ok(Self::new(HabitService::open(config)?))
    }
}

// Tool input schemas

/// Input for creating a habit.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitInput {
    /// Habit name (required).
    pub name: String,
    /// Display color, e.g. `#fcd34d` or `var(--accent-cyan)` (optional).
    pub color: Option<String>,
}

/// Input for renaming a habit.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RenameHabitInput {
    /// Habit ID.
    pub id: i64,
    /// New name.
    pub name: String,
}

/// Input for writing a habit's status and streak.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetHabitStatusInput {
    /// Habit ID.
    pub id: i64,
    /// Status: pending, done, or missed.
    pub status: String,
    /// Streak in days.
    pub streak: i64,
}

/// Input for tools that act on one habit.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct HabitIdInput {
    /// Habit ID.
    pub id: i64,
}

/// Input for reading a note.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetNoteInput {
    /// Day as YYYY-MM-DD (defaults to today).
    pub date: Option<String>,
}

/// Input for saving a note.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SaveNoteInput {
    /// Day as YYYY-MM-DD (defaults to today).
    pub date: Option<String>,
    /// Note text.
    #[serde(default)]
    pub content: String,
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Convert a service result into a tool result.
///
/// An unknown habit is reported as a successful text result so agents can
/// tell it apart from a broken request.
fn respond<T: Serialize>(
    result: crate::error::Result<T>,
    guard: &mut OperationGuard,
) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => json_result(&value),
        Err(Error::TaskNotFound(id)) => {
            Ok(CallToolResult::success(vec![Content::text(format!("Habit not found: {id}"))]))
        }
        Err(e) => {
            guard.mark_error();
            Err(match e.kind() {
                ErrorKind::InvalidInput => McpError::invalid_params(e.to_string(), None),
                ErrorKind::NotFound | ErrorKind::StoreFailure => {
                    tracing::error!(error = %e, "tool call failed");
                    McpError::internal_error(e.to_string(), None)
                }
            })
        }
    }
}

#[tool(tool_box)]
impl HabitsServer {
    /// List habits for today.
    #[tool(description = "List all habits with today's status, streak, and 7-day history")]
    fn list_habits(&self) -> Result<CallToolResult, McpError> {
        let mut guard = OperationGuard::new("list_habits");
        respond(self.service.list_tasks(), &mut guard)
    }

    /// Create a habit.
    #[tool(description = "Create a new habit with a name and optional color")]
    fn create_habit(
        &self,
        #[tool(aggr)] input: CreateHabitInput,
    ) -> Result<CallToolResult, McpError> {
        let mut guard = OperationGuard::new("create_habit");
        let request = NewTask { name: Some(input.name), color: input.color };
        respond(self.service.create_task(&request), &mut guard)
    }

    /// Rename a habit.
    #[tool(description = "Rename a habit")]
    fn rename_habit(
        &self,
        #[tool(aggr)] input: RenameHabitInput,
    ) -> Result<CallToolResult, McpError> {
        let mut guard = OperationGuard::new("rename_habit");
        let patch =
            TaskPatch { id: Some(input.id), name: Some(input.name), ..TaskPatch::default() };
        respond(self.service.update_task(&patch), &mut guard)
    }

    /// Write a habit's status and streak directly.
    #[tool(description = "Set a habit's status (pending, done, missed) and streak directly")]
    fn set_habit_status(
        &self,
        #[tool(aggr)] input: SetHabitStatusInput,
    ) -> Result<CallToolResult, McpError> {
        let mut guard = OperationGuard::new("set_habit_status");
        let patch = TaskPatch {
            id: Some(input.id),
            name: None,
            status: Some(input.status),
            streak: Some(input.streak),
        };
        respond(self.service.update_task(&patch), &mut guard)
    }

    /// Complete a habit for today.
    #[tool(description = "Mark a pending habit as done for today, extending its streak")]
    fn complete_habit(
        &self,
        #[tool(aggr)] input: HabitIdInput,
    ) -> Result<CallToolResult, McpError> {
        let mut guard = OperationGuard::new("complete_habit");
        respond(self.service.apply_action(input.id, Action::Complete), &mut guard)
    }

    /// Miss a habit for today.
    #[tool(description = "Mark a pending habit as missed for today, clearing its streak")]
    fn miss_habit(&self, #[tool(aggr)] input: HabitIdInput) -> Result<CallToolResult, McpError> {
        let mut guard = OperationGuard::new("miss_habit");
        respond(self.service.apply_action(input.id, Action::Miss), &mut guard)
    }

    /// Undo today's status.
    #[tool(
        description = "Return a habit to pending, taking back today's streak day if it was done"
    )]
    fn undo_habit(&self, #[tool(aggr)] input: HabitIdInput) -> Result<CallToolResult, McpError> {
        let mut guard = OperationGuard::new("undo_habit");
        respond(self.service.apply_action(input.id, Action::Undo), &mut guard)
    }

    /// Delete a habit.
    #[tool(description = "Delete a habit by its ID")]
    fn delete_habit(&self, #[tool(aggr)] input: HabitIdInput) -> Result<CallToolResult, McpError> {
        let mut guard = OperationGuard::new("delete_habit");
        match self.service.delete_task(Some(input.id)) {
            Ok(()) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Deleted habit: {}",
                input.id
            ))])),
            Err(e) => respond::<()>(Err(e), &mut guard),
        }
    }

    /// Read a day's note.
    #[tool(description = "Get the note for a day (YYYY-MM-DD, defaults to today)")]
    fn get_note(&self, #[tool(aggr)] input: GetNoteInput) -> Result<CallToolResult, McpError> {
        let mut guard = OperationGuard::new("get_note");
        let date = input.date.unwrap_or_else(|| format_day(self.service.today()));
        respond(self.service.get_note(Some(&date)), &mut guard)
    }

    /// Save a day's note.
    #[tool(description = "Save the note for a day, replacing any earlier note for that day")]
    fn save_note(&self, #[tool(aggr)] input: SaveNoteInput) -> Result<CallToolResult, McpError> {
        let mut guard = OperationGuard::new("save_note");
        let date = input.date.unwrap_or_else(|| format_day(self.service.today()));
        let note = NoteInput { date: Some(date), content: Some(input.content) };
        respond(self.service.save_note(&note), &mut guard)
    }

    /// Today's statistics.
    #[tool(
        description = "Get today's completion rate, top streak, and per-habit consistency scores"
    )]
    fn get_stats(&self) -> Result<CallToolResult, McpError> {
        let mut guard = OperationGuard::new("get_stats");
        respond(self.service.stats(), &mut guard)
    }
}

#[rmcp::tool(tool_box)]
impl rmcp::ServerHandler for HabitsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "habits-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::SqliteHabitStore;
    use crate::traits::FixedClock;
    use chrono::NaiveDate;
    use serde_json::Value;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn server(dir: &TempDir) -> HabitsServer {
        let store = SqliteHabitStore::new(dir.path().join("habits.db")).unwrap();
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2026, 2, 21).unwrap());
        HabitsServer::new(HabitService::new(
            Arc::new(store),
            Arc::new(clock),
            AppConfig::default(),
        ))
    }

    fn text(result: &CallToolResult) -> String {
        let value = serde_json::to_value(result).unwrap();
        value["content"][0]["text"].as_str().unwrap().to_string()
    }

    fn json(result: &CallToolResult) -> Value {
        serde_json::from_str(&text(result)).unwrap()
    }

    fn error_code(err: &McpError) -> i64 {
        serde_json::to_value(err).unwrap()["code"].as_i64().unwrap()
    }

    #[test]
    fn test_create_complete_and_list() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);

        let created = server
            .create_habit(CreateHabitInput { name: "Stretching".into(), color: None })
            .unwrap();
        let id = json(&created)["id"].as_i64().unwrap();

        let done = server.complete_habit(HabitIdInput { id }).unwrap();
        assert_eq!(json(&done)["status"], "done");
        assert_eq!(json(&done)["streak"], 1);

        let list = server.list_habits().unwrap();
        assert_eq!(json(&list)[0]["name"], "Stretching");
    }

    #[test]
    fn test_invalid_input_is_invalid_params() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);

        let err = server
            .create_habit(CreateHabitInput { name: "  ".into(), color: None })
            .unwrap_err();
        assert_eq!(error_code(&err), -32602);

        let err = server
            .set_habit_status(SetHabitStatusInput { id: 1, status: "great".into(), streak: 1 })
            .unwrap_err();
        assert_eq!(error_code(&err), -32602);
    }

    #[test]
    fn test_unknown_habit_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);

        let result = server.undo_habit(HabitIdInput { id: 42 }).unwrap();
        assert_eq!(text(&result), "Habit not found: 42");

        let result = server.delete_habit(HabitIdInput { id: 42 }).unwrap();
        assert_eq!(text(&result), "Habit not found: 42");
    }

    #[test]
    fn test_notes_default_to_today() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);

        server.save_note(SaveNoteInput { date: None, content: "Rested".into() }).unwrap();

        let note = server.get_note(GetNoteInput { date: Some("2026-02-21".into()) }).unwrap();
        assert_eq!(json(&note)["content"], "Rested");

        let err = server.get_note(GetNoteInput { date: Some("yesterday".into()) }).unwrap_err();
        assert_eq!(error_code(&err), -32602);
    }

    #[test]
    fn test_stats() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir);
        server.create_habit(CreateHabitInput { name: "Walk".into(), color: None }).unwrap();

        let stats = json(&server.get_stats().unwrap());
        assert_eq!(stats["date"], "2026-02-21");
        assert_eq!(stats["total"], 1);
        assert_eq!(stats["tasks"][0]["score"], 0);
    }

    #[test]
    fn test_server_info() {
        let dir = TempDir::new().unwrap();
        let info = rmcp::ServerHandler::get_info(&server(&dir));
        assert_eq!(info.server_info.name, "habits-mcp");
        assert!(info.instructions.unwrap().contains("habit"));
    }
}
