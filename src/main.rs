//! Application entry point.
//!
//! Parses command-line arguments and delegates execution to [`runner::run`].

use clap::Parser;
use std::io;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;
use vrog::{cli::Cli, runner};

fn main() -> ExitCode {
    let cli = Cli::parse().with_default_command();
    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::ERROR
    };
    fmt()
        .with_max_level(max_level)
        .with_writer(io::stderr)
        .init();
    match runner::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("vrog failed\n{}", runner::render_error(&err));
            ExitCode::FAILURE
        }
    }
}
