//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the manifest, registers its rules and dispatches the chosen command
//! against the resulting [`Engine`].

mod error;

pub use error::RunnerError;

use crate::cli::{BuildArgs, Cli, Commands};
use crate::context::BuildContext;
use crate::engine::{CLEAN_TARGET, Engine};
use crate::manifest::ManifestError;
use crate::{graph, manifest};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use std::env;
use std::io::{self, Write};
use tracing::debug;

/// Execute the parsed [`Cli`] against the host filesystem and processes.
///
/// Changes into `--directory` first, so manifest paths, sources and
/// targets all resolve relative to it.
///
/// # Errors
///
/// Returns an error if the directory cannot be entered, the manifest cannot
/// be loaded, or the command fails.
pub fn run(cli: &Cli) -> Result<()> {
    if let Some(dir) = &cli.directory {
        env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
        debug!("working directory is now {}", dir.display());
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli, BuildContext::host(), &mut out)
}

/// Load the manifest named by `cli` and run its command with `context`,
/// writing listings to `out`.
///
/// `cli.directory` is not consulted; [`run`] has already applied it.
///
/// # Errors
///
/// Returns an error if the manifest is missing or invalid, no target can be
/// chosen, a build fails, or writing to `out` fails.
pub fn execute(cli: &Cli, context: BuildContext, out: &mut dyn Write) -> Result<()> {
    let path = manifest_path(cli)?;
    if !path.is_file() {
        return Err(RunnerError::ManifestNotFound { path }.into());
    }
    let loaded =
        manifest::from_path(&path).with_context(|| format!("failed to load manifest {path}"))?;
    let defaults = loaded.defaults.clone();
    let mut engine = Engine::new(context);
    manifest::populate(&mut engine, loaded)
        .with_context(|| format!("failed to register rules from {path}"))?;
    debug!("registered {} targets", engine.len());

    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Commands::Build(BuildArgs::default()));
    match command {
        Commands::Build(args) => handle_build(&engine, &args, &defaults),
        Commands::Clean => engine.build(CLEAN_TARGET).context("clean failed"),
        Commands::Graph => out
            .write_all(graph::render_dot(&engine).as_bytes())
            .context("failed to write graph"),
        Commands::Targets => write_targets(&engine, out).context("failed to write targets"),
    }
}

/// Format `err` for the terminal.
///
/// Manifest and runner errors are drawn with miette's graphical handler, so
/// YAML failures show the offending line with a label and a hint. Other
/// errors print their context chain on one line.
#[must_use]
pub fn render_error(err: &anyhow::Error) -> String {
    let diagnostic: &dyn Diagnostic = if let Some(found) = err.downcast_ref::<ManifestError>() {
        match found {
            ManifestError::Parse { source } => source.as_ref(),
            other => other,
        }
    } else if let Some(found) = err.downcast_ref::<RunnerError>() {
        found
    } else {
        return format!("{err:#}");
    };
    let headline = err.to_string();
    let mut rendered = if headline == diagnostic.to_string() {
        String::new()
    } else {
        format!("{headline}\n")
    };
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    if handler.render_report(&mut rendered, diagnostic).is_err() {
        return format!("{err:#}");
    }
    rendered
}

fn manifest_path(cli: &Cli) -> Result<Utf8PathBuf, RunnerError> {
    Utf8PathBuf::from_path_buf(cli.file.clone()).map_err(|path| RunnerError::NonUtf8Path {
        path: path.display().to_string(),
    })
}

fn handle_build(engine: &Engine, args: &BuildArgs, defaults: &[String]) -> Result<()> {
    let targets = if args.targets.is_empty() {
        defaults
    } else {
        args.targets.as_slice()
    };
    if targets.is_empty() {
        return Err(RunnerError::NoTargets.into());
    }
    debug!("building {}", targets.join(" "));
    engine
        .build_all(targets)
        .with_context(|| format!("failed to build {}", targets.join(" ")))
}

fn write_targets(engine: &Engine, out: &mut dyn Write) -> io::Result<()> {
    for (name, rule) in engine.rules() {
        writeln!(out, "{name} ({})", rule.kind())?;
    }
    out.flush()
}
