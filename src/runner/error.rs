//! Error types for the runner module.
//!
//! This submodule isolates derive-macro-affected code to scope lint
//! suppressions narrowly.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while dispatching a command.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The manifest file does not exist at the expected path.
    #[error("no manifest found at `{path}`")]
    #[diagnostic(
        code(vrog::runner::manifest_not_found),
        help("create a Vrogfile or pass its location with --file")
    )]
    ManifestNotFound {
        /// The path that was attempted.
        path: Utf8PathBuf,
    },

    /// A path given on the command line is not valid UTF-8.
    #[error("path `{path}` is not valid UTF-8")]
    #[diagnostic(code(vrog::runner::non_utf8_path))]
    NonUtf8Path {
        /// Lossy rendering of the path.
        path: String,
    },

    /// `build` was run without targets and the manifest lists no defaults.
    #[error("no targets given and the manifest declares no defaults")]
    #[diagnostic(
        code(vrog::runner::no_targets),
        help("name targets on the command line or add a `defaults` list")
    )]
    NoTargets,
}
