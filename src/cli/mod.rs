//! Command-line interface for the habit tracker.
//!
//! Read commands render a text view through templates; pass `--json` for
//! machine-readable output instead.

mod note;
mod run;


pub use note::NoteCommand;
pub use run::{run, run_with, CliOutput};

use clap::{Parser, Subcommand};

/// Daily habit tracker with streaks, a 7-day history, and notes.
///
/// Habits roll over to a new day the first time they are read after
/// midnight. For help on any command, use:
///   habit-tracker <command> --help
#[derive(Parser, Debug)]
#[command(name = "habit-tracker")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show today's habits.
    List,

    /// Create a habit.
    Add {
        /// Habit name
        name: String,

        /// Display color (defaults to the configured color)
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Rename a habit.
    Rename {
        /// Habit ID
        id: i64,

        /// New name
        name: String,
    },

    /// Mark a pending habit as done for today.
    Done {
        /// Habit ID
        id: i64,
    },

    /// Mark a pending habit as missed for today.
    Miss {
        /// Habit ID
        id: i64,
    },

    /// Return a habit to pending, taking back today's streak day if it was done.
    Undo {
        /// Habit ID
        id: i64,
    },

    /// Write a habit's status and streak directly.
    #[command(name = "set-status")]
    SetStatus {
        /// Habit ID
        id: i64,

        /// Status: pending, done, missed
        status: String,

        /// Streak in days
        streak: i64,
    },

    /// Delete a habit.
    Delete {
        /// Habit ID
        id: i64,
    },

    /// Daily notes.
    #[command(subcommand)]
    Note(NoteCommand),

    /// Show completion, streak, and consistency figures.
    Stats,

    /// Seed the default habits into an empty database.
    Setup,

    /// Show version information.
    Version,
}
