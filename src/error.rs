//! Error types shared by the engine and rule variants.
//!
//! Every failure that can stop a build is a [`BuildError`]. Failures of an
//! external process are described by a nested [`CommandError`] so callers can
//! tell a missing compiler from a failed compilation.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::io;
use thiserror::Error;

/// Errors raised while registering rules or building targets.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    /// A registration or construction call received malformed input.
    #[error("invalid argument: {message}")]
    #[diagnostic(code(vrog::invalid_argument))]
    InvalidArgument {
        /// What was wrong with the input.
        message: String,
    },

    /// A build was requested for a name with no registered rule.
    #[error("no rule to build target `{target}`")]
    #[diagnostic(
        code(vrog::unknown_target),
        help("run `vrog targets` to list the registered targets")
    )]
    UnknownTarget {
        /// The requested target.
        target: String,
    },

    /// The prerequisite graph reachable from a target contains a cycle.
    #[error("dependency cycle detected while building `{target}`: {}", cycle.join(" -> "))]
    #[diagnostic(code(vrog::cyclic_dependency))]
    CyclicDependency {
        /// The requested target.
        target: String,
        /// Names along the cycle; the first and last entries are equal.
        cycle: Vec<String>,
    },

    /// An external process failed while building a target.
    #[error("`{command}` failed while building `{target}`")]
    #[diagnostic(code(vrog::external_command_failed))]
    ExternalCommandFailed {
        /// The target whose rule spawned the process.
        target: String,
        /// The rendered command line.
        command: String,
        /// Why the process failed.
        #[source]
        source: CommandError,
    },

    /// A filesystem query or removal failed for a reason other than the
    /// file being absent.
    #[error("failed to access `{path}`")]
    #[diagnostic(code(vrog::io))]
    Io {
        /// The path being queried or removed.
        path: Utf8PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    /// Build an [`BuildError::InvalidArgument`] from any message.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Failures of a spawned process.
#[derive(Debug, Error, Diagnostic)]
pub enum CommandError {
    /// The process could not be spawned (executable missing, permission
    /// failure, etc.).
    #[error("failed to spawn `{program}`")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The process exited with a non-zero status or was terminated by a
    /// signal.
    #[error("{}", describe_exit(*status, stderr))]
    Exit {
        /// Exit status (`None` when terminated by a signal).
        status: Option<i32>,
        /// Captured stderr, empty when stderr was inherited.
        stderr: String,
    },

    /// Captured standard output was not valid UTF-8.
    #[error("process output is not valid UTF-8")]
    InvalidUtf8,

    /// Captured output could not be interpreted.
    #[error("unexpected process output: {reason}")]
    InvalidOutput {
        /// Why the output was rejected.
        reason: String,
    },
}

fn describe_exit(status: Option<i32>, stderr: &str) -> String {
    let head = status.map_or_else(
        || "process terminated by signal".to_owned(),
        |code| format!("process exited with status {code}"),
    );
    let detail = stderr.trim();
    if detail.is_empty() {
        head
    } else {
        format!("{head}: {detail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(1), "", "process exited with status 1")]
    #[case(None, "", "process terminated by signal")]
    #[case(Some(2), "a.c:1: error\n", "process exited with status 2: a.c:1: error")]
    fn exit_errors_describe_status_and_stderr(
        #[case] status: Option<i32>,
        #[case] stderr: &str,
        #[case] expected: &str,
    ) {
        let err = CommandError::Exit {
            status,
            stderr: stderr.to_owned(),
        };
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn cyclic_dependency_lists_the_cycle() {
        let err = BuildError::CyclicDependency {
            target: "a".into(),
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(
            err.to_string(),
            "dependency cycle detected while building `a`: a -> b -> a"
        );
    }
}
