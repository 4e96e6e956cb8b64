//! Habit store trait and `SQLite` implementation.

use crate::error::Result;
use crate::tasks::models::{format_day, parse_day, History, Note, Status, Task};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Columns selected for a task row, in the order `parse_task` reads them.
const TASK_COLUMNS: &str = "id, name, status, streak, color, history, last_reset, created_at";

/// Trait for habit storage operations.
///
/// Each method is a single unit of work against the store. Methods returning
/// `Option` or `bool` report a missing task that way instead of failing.
#[allow(clippy::missing_errors_doc)]
pub trait HabitStore: Send + Sync {
    // Task CRUD
    /// Create a pending task with an empty history, reset as of `today`.
    fn create_task(&self, name: &str, color: &str, today: NaiveDate) -> Result<Task>;

    /// Get a task by ID.
    fn get_task(&self, id: i64) -> Result<Option<Task>>;

    /// List all tasks in creation order, exactly as stored.
    fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Apply a partial update and return the resulting row.
    fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Option<Task>>;

    /// Persist a reset result only if the stored `last_reset` still equals
    /// `previous`, the value the reset was computed from.
    ///
    /// Returns `false` when nothing was written (the task is gone or another
    /// reader got there first).
    fn save_reset(&self, task: &Task, previous: Option<NaiveDate>) -> Result<bool>;

    /// Delete a task by ID.
    fn delete_task(&self, id: i64) -> Result<bool>;

    /// Number of stored tasks.
    fn count_tasks(&self) -> Result<usize>;

    // Notes
    /// Get the note saved for a day, if any.
    fn get_note(&self, date: NaiveDate) -> Result<Option<Note>>;

    /// Insert or overwrite the note for a day.
    fn upsert_note(&self, date: NaiveDate, content: &str) -> Result<Note>;
}

/// A partial task update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskUpdate {
    /// Change the display name only.
    Rename(String),
    /// Write today's status and the streak together.
    Progress {
        /// New status.
        status: Status,
        /// New streak.
        streak: u32,
    },
}

/// SQLite-based habit store.
#[derive(Debug, Clone)]
pub struct SqliteHabitStore {
    db_path: PathBuf,
}

impl SqliteHabitStore {
    /// Create a new `SQLite` habit store at the given database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = Self { db_path: db_path.as_ref().to_path_buf() };
        store.init_schema()?;
        Ok(store)
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection to the database.
    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(conn)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'done', 'missed')),
                streak INTEGER NOT NULL DEFAULT 0 CHECK (streak >= 0),
                color TEXT NOT NULL DEFAULT 'var(--accent-cyan)',
                history TEXT NOT NULL DEFAULT '[0,0,0,0,0,0,0]',
                last_reset TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- One note per calendar day
            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL UNIQUE,
                content TEXT NOT NULL DEFAULT '',
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
            ",
        )?;

        Ok(())
    }

    /// Parse a task from a row selected with [`TASK_COLUMNS`].
    fn parse_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        let status_str: String = row.get(2)?;
        let streak: i64 = row.get(3)?;
        let history: String = row.get(5)?;
        let last_reset: Option<String> = row.get(6)?;

        Ok(Task {
            id: row.get(0)?,
            name: row.get(1)?,
            status: Status::from_str(&status_str).unwrap_or(Status::Pending),
            streak: u32::try_from(streak).unwrap_or(0),
            color: row.get(4)?,
            history: History::decode(&history),
            last_reset: last_reset.as_deref().and_then(parse_day),
            created_at: row.get(7)?,
        })
    }

    fn query_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                Self::parse_task,
            )
            .optional()?;
        Ok(task)
    }
}

impl HabitStore for SqliteHabitStore {
    fn create_task(&self, name: &str, color: &str, today: NaiveDate) -> Result<Task> {
        let conn = self.open()?;

        conn.execute(
            "INSERT INTO tasks (name, color, status, streak, history, last_reset)
             VALUES (?1, ?2, 'pending', 0, ?3, ?4)",
            params![name, color, History::default().encode(), format_day(today)],
        )?;

        let id = conn.last_insert_rowid();
        let task = conn.query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id],
            Self::parse_task,
        )?;

        Ok(task)
    }

    fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.open()?;
        Self::query_task(&conn, id)
    }

    fn list_tasks(&self) -> Result<Vec<Task>> {
        let conn = self.open()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at, id"))?;
        let tasks = stmt.query_map([], Self::parse_task)?.collect::<rusqlite::Result<_>>()?;
        Ok(tasks)
    }

    fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Option<Task>> {
        let conn = self.open()?;

        let rows = match update {
            TaskUpdate::Rename(name) => {
                conn.execute("UPDATE tasks SET name = ?1 WHERE id = ?2", params![name, id])?
            }
            TaskUpdate::Progress { status, streak } => conn.execute(
                "UPDATE tasks SET status = ?1, streak = ?2 WHERE id = ?3",
                params![status.as_str(), streak, id],
            )?,
        };

        if rows == 0 {
            return Ok(None);
        }
        Self::query_task(&conn, id)
    }

    fn save_reset(&self, task: &Task, previous: Option<NaiveDate>) -> Result<bool> {
        let conn = self.open()?;
        let last_reset = task.last_reset.map(format_day);
        let previous = previous.map(format_day);

        // A stored value that does not parse as a date was read back as absent
        let rows = conn.execute(
            "UPDATE tasks SET status = ?1, streak = ?2, history = ?3, last_reset = ?4
             WHERE id = ?5
               AND (last_reset IS ?6 OR (?6 IS NULL AND date(last_reset) IS NULL))",
            params![
                task.status.as_str(),
                task.streak,
                task.history.encode(),
                last_reset,
                task.id,
                previous
            ],
        )?;

        Ok(rows > 0)
    }

    fn delete_task(&self, id: i64) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn count_tasks(&self) -> Result<usize> {
        let conn = self.open()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn get_note(&self, date: NaiveDate) -> Result<Option<Note>> {
        let conn = self.open()?;
        let note = conn
            .query_row(
                "SELECT content, updated_at FROM notes WHERE date = ?1",
                params![format_day(date)],
                |row| Ok(Note { date, content: row.get(0)?, updated_at: Some(row.get(1)?) }),
            )
            .optional()?;
        Ok(note)
    }

    fn upsert_note(&self, date: NaiveDate, content: &str) -> Result<Note> {
        let conn = self.open()?;
        let day = format_day(date);

        conn.execute(
            "INSERT INTO notes (date, content) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE
             SET content = excluded.content, updated_at = datetime('now')",
            params![&day, content],
        )?;

        let note = conn.query_row(
            "SELECT content, updated_at FROM notes WHERE date = ?1",
            params![&day],
            |row| Ok(Note { date, content: row.get(0)?, updated_at: Some(row.get(1)?) }),
        )?;
        Ok(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, SqliteHabitStore) {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("test.db");
        let store = SqliteHabitStore::new(&db_path).unwrap();
        (dir, store)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_and_get_task() {
        let (_dir, store) = create_test_store();

        let task = store.create_task("Meditation", "var(--accent-cyan)", day(2026, 2, 21)).unwrap();
        assert_eq!(task.name, "Meditation");
        assert_eq!(task.color, "var(--accent-cyan)");
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.streak, 0);
        assert_eq!(task.history, History::default());
        assert_eq!(task.last_reset, Some(day(2026, 2, 21)));
        assert!(!task.created_at.is_empty());

        let fetched = store.get_task(task.id).unwrap().unwrap();
        assert_eq!(fetched, task);
    }

    #[test]
    fn test_get_nonexistent_task() {
        let (_dir, store) = create_test_store();
        assert!(store.get_task(999).unwrap().is_none());
    }

    #[test]
    fn test_list_tasks_in_creation_order() {
        let (_dir, store) = create_test_store();
        let today = day(2026, 2, 21);

        store.create_task("Wake up early", "a", today).unwrap();
        store.create_task("Sunlight", "b", today).unwrap();
        store.create_task("Reading", "c", today).unwrap();

        let names: Vec<String> = store.list_tasks().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Wake up early", "Sunlight", "Reading"]);
        assert_eq!(store.count_tasks().unwrap(), 3);
    }

    #[test]
    fn test_rename() {
        let (_dir, store) = create_test_store();
        let task = store.create_task("Walk", "a", day(2026, 2, 21)).unwrap();

        let rename = TaskUpdate::Rename("Evening walk".into());
        let updated = store.update_task(task.id, &rename).unwrap().unwrap();
        assert_eq!(updated.name, "Evening walk");
        assert_eq!(updated.status, Status::Pending);
    }

    #[test]
    fn test_progress_update() {
        let (_dir, store) = create_test_store();
        let task = store.create_task("Walk", "a", day(2026, 2, 21)).unwrap();

        let updated = store
            .update_task(task.id, &TaskUpdate::Progress { status: Status::Done, streak: 6 })
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, Status::Done);
        assert_eq!(updated.streak, 6);
        assert_eq!(updated.name, "Walk");
    }

    #[test]
    fn test_update_nonexistent_task() {
        let (_dir, store) = create_test_store();
        let result = store.update_task(42, &TaskUpdate::Rename("x".into())).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_delete_task() {
        let (_dir, store) = create_test_store();
        let task = store.create_task("Walk", "a", day(2026, 2, 21)).unwrap();

        assert!(store.delete_task(task.id).unwrap());
        assert!(store.get_task(task.id).unwrap().is_none());
        assert!(!store.delete_task(task.id).unwrap());
    }

    #[test]
    fn test_save_reset_writes_once_per_day() {
        let (_dir, store) = create_test_store();
        let task = store.create_task("Walk", "a", day(2026, 2, 20)).unwrap();

        let mut reset = task.clone();
        reset.history.push(true);
        reset.last_reset = Some(day(2026, 2, 21));

        assert!(store.save_reset(&reset, task.last_reset).unwrap());
        let stored = store.get_task(task.id).unwrap().unwrap();
        assert_eq!(stored.history.days(), &[0, 0, 0, 0, 0, 0, 10]);
        assert_eq!(stored.last_reset, Some(day(2026, 2, 21)));

        // A second reader that computed the same reset must not shift again
        assert!(!store.save_reset(&reset, task.last_reset).unwrap());
        let stored = store.get_task(task.id).unwrap().unwrap();
        assert_eq!(stored.history.days(), &[0, 0, 0, 0, 0, 0, 10]);
    }

    #[test]
    fn test_stale_reset_does_not_overwrite_newer_reset() {
        let (_dir, store) = create_test_store();
        let task = store.create_task("Walk", "a", day(2026, 2, 19)).unwrap();

        // Read on the 20th, but the write lands after another reader's
        // reset for the 21st
        let mut stale = task.clone();
        stale.history.push(true);
        stale.last_reset = Some(day(2026, 2, 20));

        let mut newer = task.clone();
        newer.history.push(true);
        newer.last_reset = Some(day(2026, 2, 21));
        assert!(store.save_reset(&newer, task.last_reset).unwrap());

        assert!(!store.save_reset(&stale, task.last_reset).unwrap());
        let stored = store.get_task(task.id).unwrap().unwrap();
        assert_eq!(stored.last_reset, Some(day(2026, 2, 21)));
        assert_eq!(stored.history.days(), &[0, 0, 0, 0, 0, 0, 10]);
    }

    #[test]
    fn test_save_reset_over_unreadable_last_reset() {
        let (_dir, store) = create_test_store();
        let task = store.create_task("Walk", "a", day(2026, 2, 20)).unwrap();
        store
            .open()
            .unwrap()
            .execute("UPDATE tasks SET last_reset = 'yesterday' WHERE id = ?1", params![task.id])
            .unwrap();

        let read = store.get_task(task.id).unwrap().unwrap();
        assert_eq!(read.last_reset, None);

        let mut reset = read.clone();
        reset.last_reset = Some(day(2026, 2, 21));
        assert!(store.save_reset(&reset, read.last_reset).unwrap());
        let stored = store.get_task(task.id).unwrap().unwrap();
        assert_eq!(stored.last_reset, Some(day(2026, 2, 21)));
    }

    #[test]
    fn test_save_reset_missing_task() {
        let (_dir, store) = create_test_store();
        let task = store.create_task("Walk", "a", day(2026, 2, 20)).unwrap();
        store.delete_task(task.id).unwrap();

        let previous = task.last_reset;
        let mut reset = task;
        reset.last_reset = Some(day(2026, 2, 21));
        assert!(!store.save_reset(&reset, previous).unwrap());
    }

    #[test]
    fn test_legacy_rows_decode() {
        let (_dir, store) = create_test_store();
        let conn = store.open().unwrap();
        conn.execute(
            "INSERT INTO tasks (name, history, last_reset) VALUES ('Legacy', '[10,10]', NULL)",
            [],
        )
        .unwrap();

        let tasks = store.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].history.days(), &[0, 0, 0, 0, 0, 10, 10]);
        assert_eq!(tasks[0].last_reset, None);
        assert_eq!(tasks[0].color, "var(--accent-cyan)");
    }

    #[test]
    fn test_note_upsert_and_get() {
        let (_dir, store) = create_test_store();
        let date = day(2026, 2, 21);

        assert!(store.get_note(date).unwrap().is_none());

        let note = store.upsert_note(date, "X").unwrap();
        assert_eq!(note.content, "X");
        assert!(note.updated_at.is_some());

        let fetched = store.get_note(date).unwrap().unwrap();
        assert_eq!(fetched.content, "X");
        assert_eq!(fetched.date, date);
    }

    #[test]
    fn test_note_upsert_overwrites() {
        let (_dir, store) = create_test_store();
        let date = day(2026, 2, 21);

        store.upsert_note(date, "first").unwrap();
        store.upsert_note(date, "second").unwrap();

        assert_eq!(store.get_note(date).unwrap().unwrap().content, "second");
        assert!(store.get_note(day(2026, 2, 22)).unwrap().is_none());
    }

    #[test]
    fn test_reopen_existing_database() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("habits.sqlite3");

        let store = SqliteHabitStore::new(&db_path).unwrap();
        store.create_task("Walk", "a", day(2026, 2, 21)).unwrap();

        let reopened = SqliteHabitStore::new(&db_path).unwrap();
        assert_eq!(reopened.count_tasks().unwrap(), 1);
        assert_eq!(reopened.db_path(), db_path);
    }
}
