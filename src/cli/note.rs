//! Note CLI subcommands.

use clap::Subcommand;

/// Notes are free text keyed by day. Each day has at most one note, and
/// saving replaces the previous text.
#[derive(Subcommand, Debug, Clone)]
pub enum NoteCommand {
    /// Show the note for a day.
    Get {
        /// Day as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Replace the note for a day.
    Set {
        /// Day as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Note text
        content: String,
    },
}
