//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::cli::{Cli, Command, NoteCommand};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::service::{HabitService, NewTask, NoteInput, TaskPatch};
use crate::tasks::{format_day, Action, DailySummary, Task};
use crate::templates;
use serde::Serialize;
use std::process::ExitCode;
use tera::Context;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Run a parsed command line against the configured database.
pub fn run(cli: Cli) -> CliOutput {
    if matches!(cli.command, Command::Version) {
        return run_version();
    }

    let service = match AppConfig::load().and_then(HabitService::open) {
        Ok(service) => service,
        Err(e) => return error_output(&e),
    };
    run_with(&service, cli.command, cli.json)
}

/// Run a command against an existing service.
pub fn run_with(service: &HabitService, command: Command, json: bool) -> CliOutput {
    let result = match command {
        Command::Version => return run_version(),
        Command::List => run_list(service, json),
        Command::Add { name, color } => service
            .create_task(&NewTask { name: Some(name), color })
            .and_then(|task| task_output(&task, "Added", json)),
        Command::Rename { id, name } => service
            .update_task(&TaskPatch { id: Some(id), name: Some(name), ..TaskPatch::default() })
            .and_then(|task| task_output(&task, "Renamed", json)),
        Command::Done { id } => run_action(service, id, Action::Complete, json),
        Command::Miss { id } => run_action(service, id, Action::Miss, json),
        Command::Undo { id } => run_action(service, id, Action::Undo, json),
        Command::SetStatus { id, status, streak } => service
            .update_task(&TaskPatch {
                id: Some(id),
                name: None,
                status: Some(status),
                streak: Some(streak),
            })
            .and_then(|task| task_output(&task, "Updated", json)),
        Command::Delete { id } => {
            service.delete_task(Some(id)).map(|()| success_output(format!("Deleted habit {id}")))
        }
        Command::Note(cmd) => run_note_cmd(service, cmd, json),
        Command::Stats => run_stats(service, json),
        Command::Setup => run_setup(service),
    };

    result.unwrap_or_else(|e| error_output(&e))
}

fn run_version() -> CliOutput {
    success_output(format!("habit-tracker v{}", crate::VERSION))
}

fn run_list(service: &HabitService, json: bool) -> Result<CliOutput> {
    let tasks = service.list_tasks()?;
    if json {
        return json_output(&tasks);
    }

    let mut ctx = Context::new();
    ctx.insert("date", &service.today());
    ctx.insert("tasks", &tasks);
    ctx.insert("summary", &DailySummary::from_tasks(&tasks));
    Ok(success_output(templates::render(templates::DASHBOARD, &ctx)?))
}

fn run_action(service: &HabitService, id: i64, action: Action, json: bool) -> Result<CliOutput> {
    let before = service.get_task(id)?;
    let task = service.apply_action(id, action)?;
    if task.status == before.status && !json {
        return Ok(success_output(format!(
            "{}. {} is already {}, nothing to do",
            task.id, task.name, task.status
        )));
    }
    task_output(&task, action_verb(action), json)
}

const fn action_verb(action: Action) -> &'static str {
    match action {
        Action::Complete => "Completed",
        Action::Miss => "Missed",
        Action::Undo => "Reopened",
    }
}

fn run_note_cmd(service: &HabitService, cmd: NoteCommand, json: bool) -> Result<CliOutput> {
    match cmd {
        NoteCommand::Get { date } => {
            let date = date.unwrap_or_else(|| format_day(service.today()));
            let note = service.get_note(Some(&date))?;
            if json {
                return json_output(&note);
            }
            Ok(success_output(templates::render_value(templates::NOTE, "note", &note)?))
        }
        NoteCommand::Set { date, content } => {
            let date = date.unwrap_or_else(|| format_day(service.today()));
            let note = service.save_note(&NoteInput { date: Some(date), content: Some(content) })?;
            if json {
                return json_output(&note);
            }
            Ok(success_output(format!("Saved note for {}", note.date)))
        }
    }
}

fn run_stats(service: &HabitService, json: bool) -> Result<CliOutput> {
    let stats = service.stats()?;
    if json {
        return json_output(&stats);
    }
    Ok(success_output(templates::render_value(templates::STATS, "stats", &stats)?))
}

fn run_setup(service: &HabitService) -> Result<CliOutput> {
    let seeded = service.setup()?;
    let message = if seeded == 0 {
        "Habits already exist, nothing seeded".to_string()
    } else {
        format!("Seeded {seeded} default habits")
    };
    Ok(success_output(message))
}

fn task_output(task: &Task, verb: &str, json: bool) -> Result<CliOutput> {
    if json {
        return json_output(task);
    }
    Ok(success_output(format!(
        "{verb} {}. {} [{}, streak {}]",
        task.id, task.name, task.status, task.streak
    )))
}

fn json_output<T: Serialize>(value: &T) -> Result<CliOutput> {
    Ok(success_output(serde_json::to_string_pretty(value)?))
}

fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

fn error_output(err: &Error) -> CliOutput {
    tracing::debug!(error = %err, "command failed");
    CliOutput {
        exit_code: ExitCode::from(1),
        stdout: vec![],
        stderr: vec![format!("Error: {err}")],
    }
}
