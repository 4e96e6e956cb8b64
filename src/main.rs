//! CLI binary for the habit tracker.
//!
//! This binary is a thin wrapper that parses arguments and delegates to the
//! library.

use clap::Parser;
use habit_tracker::cli::{run, Cli};
use habit_tracker::logging::{self, LogTarget};
use habit_tracker::paths;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Log to the file so command output stays clean
    if let Some(path) = paths::default_log_path() {
        if let Err(e) = logging::init(LogTarget::File(&path)) {
            eprintln!("Warning: logging init failed: {e}");
        }
    }

    let output = run(cli);

    for line in output.stdout {
        println!("{line}");
    }
    for line in output.stderr {
        eprintln!("{line}");
    }

    output.exit_code
}
