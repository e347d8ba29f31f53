//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. It is also
//! compiled by the build script to render the manual page, so it depends on
//! nothing but `clap` and the standard library.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// A minimal build engine for C projects described by a YAML `Vrogfile`.
#[derive(Debug, Parser)]
#[command(name = "vrog", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the manifest file to use.
    #[arg(short, long, value_name = "FILE", default_value = "Vrogfile")]
    pub file: PathBuf,

    /// Change to this directory before doing anything.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional subcommand to execute; defaults to `build` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Build(BuildArgs::default()));
        }
        self
    }
}

/// Arguments accepted by the `build` command.
#[derive(Debug, Default, Args, PartialEq, Eq, Clone)]
pub struct BuildArgs {
    /// Targets to build; the manifest defaults are used when none are given.
    pub targets: Vec<String>,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Build specified targets (or default targets if none are given) `default`.
    Build(BuildArgs),

    /// Remove every file the manifest knows how to build.
    Clean,

    /// Display the build dependency graph in DOT format for visualization.
    Graph,

    /// List registered targets with the kind of rule producing each.
    Targets,
}
