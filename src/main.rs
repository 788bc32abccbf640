//! CLI binary for `project_tracker`.
//!
//! This binary is a thin wrapper that parses arguments and delegates to the
//! library.

use std::process::ExitCode;

use clap::Parser;
use project_tracker::cli::{run, Cli};

fn main() -> ExitCode {
    let output = run(Cli::parse());

    for line in output.stdout {
        println!("{line}");
    }
    for msg in output.stderr {
        eprintln!("{msg}");
    }

    output.exit_code
}
