//! Manifest errors and YAML parse diagnostics.
//!
//! `serde_saphyr` reports a line and column for most failures. These are
//! turned into a byte span over the manifest text so `miette` can point at the
//! offending character, together with a hint for common YAML mistakes.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::{Diagnostic, NamedSource, SourceSpan};
use semver::Version;
use serde_saphyr::{Error as YamlError, Location};
use std::io;
use thiserror::Error;

use crate::error::BuildError;

const YAML_HINTS: [(&str, &str); 5] = [
    (
        "did not find expected '-'",
        "Start list items with '-' and ensure proper indentation.",
    ),
    (
        "expected ':'",
        "Ensure each key is followed by ':' separating key and value.",
    ),
    (
        "mapping values are not allowed",
        "Check for a stray ':' or quote values that contain one.",
    ),
    (
        "unknown field",
        "Check the key spelling; the manifest rejects unknown keys.",
    ),
    (
        "found character that cannot start any token",
        "Remove stray characters and indent with spaces, not tabs.",
    ),
];

/// Errors raised while loading a manifest or turning it into rules.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest `{path}`")]
    #[diagnostic(code(vrog::manifest::read))]
    Read {
        /// Manifest path.
        path: Utf8PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The YAML is malformed or does not match the schema.
    #[error("manifest parse error")]
    #[diagnostic(code(vrog::manifest::parse))]
    Parse {
        /// Diagnostic pointing at the failure.
        #[source]
        #[diagnostic_source]
        source: Box<dyn Diagnostic + Send + Sync + 'static>,
    },

    /// The manifest targets a format this build does not understand.
    #[error("unsupported manifest version {found}; this vrog reads version {supported}.x")]
    #[diagnostic(code(vrog::manifest::version))]
    UnsupportedVersion {
        /// Version declared by the manifest.
        found: Version,
        /// Supported major version.
        supported: u64,
    },

    /// A target command cannot be parsed by a POSIX shell.
    #[error("target `{target}` has an invalid command: {snippet}")]
    #[diagnostic(
        code(vrog::manifest::command),
        help("balance quotes and backticks in the command")
    )]
    InvalidCommand {
        /// Target owning the command.
        target: String,
        /// The beginning of the interpolated command.
        snippet: String,
    },

    /// A source pattern is not a valid glob.
    #[error("invalid source pattern `{pattern}`")]
    #[diagnostic(code(vrog::manifest::glob))]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Why the pattern was rejected.
        #[source]
        source: glob::PatternError,
    },

    /// A source pattern matched no files.
    #[error("source pattern `{pattern}` matched no files")]
    #[diagnostic(code(vrog::manifest::glob_empty))]
    EmptyGlob {
        /// The offending pattern.
        pattern: String,
    },

    /// A file matched by a pattern could not be read or named.
    #[error("failed to expand source pattern `{pattern}`: {reason}")]
    #[diagnostic(code(vrog::manifest::glob_io))]
    GlobMatch {
        /// The offending pattern.
        pattern: String,
        /// What went wrong.
        reason: String,
    },

    /// Registering a rule failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(vrog::yaml::parse))]
struct YamlDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("parse error here")]
    span: Option<SourceSpan>,
    #[help]
    help: Option<String>,
    #[source]
    source: YamlError,
    message: String,
}

/// Byte offset of a one-based `line`/`column` pair, clamped to the line end.
/// Columns count characters, and `\r\n` line endings are tolerated.
fn byte_offset(src: &str, line: u64, column: u64) -> usize {
    let wanted_line = usize::try_from(line.saturating_sub(1)).unwrap_or(usize::MAX);
    let wanted_column = usize::try_from(column.saturating_sub(1)).unwrap_or(usize::MAX);
    let mut offset = 0usize;
    for (index, segment) in src.split_inclusive('\n').enumerate() {
        if index == wanted_line {
            let text = segment.trim_end_matches(['\n', '\r']);
            return offset
                + text
                    .char_indices()
                    .nth(wanted_column)
                    .map_or(text.len(), |(at, _)| at);
        }
        offset += segment.len();
    }
    src.len()
}

fn span_at(src: &str, location: Location) -> SourceSpan {
    let at = byte_offset(src, location.line(), location.column());
    let is_break = |byte: &u8| *byte == b'\n' || *byte == b'\r';
    let bytes = src.as_bytes();
    let start = match bytes.get(at) {
        Some(byte) if !is_break(byte) => at,
        // Point at the last character of the line rather than its break.
        _ if at > 0 && bytes.get(at - 1).is_some_and(|byte| !is_break(byte)) => at - 1,
        _ => at,
    };
    let len = usize::from(bytes.get(start).is_some_and(|byte| !is_break(byte)));
    SourceSpan::new(start.into(), len)
}

fn starts_with_tab(src: &str, location: Option<Location>) -> bool {
    let Some(found) = location else {
        return false;
    };
    let index = usize::try_from(found.line().saturating_sub(1)).unwrap_or(usize::MAX);
    src.lines().nth(index).is_some_and(|line| {
        line.chars()
            .take_while(|c| c.is_whitespace())
            .any(|c| c == '\t')
    })
}

fn hint_for(message: &str, src: &str, location: Option<Location>) -> Option<String> {
    if starts_with_tab(src, location) {
        return Some("Use spaces for indentation; tabs are invalid in YAML.".to_owned());
    }
    let lower = message.to_lowercase();
    YAML_HINTS
        .iter()
        .find(|(needle, _)| lower.contains(*needle))
        .map(|(_, hint)| (*hint).to_owned())
}

/// Turn a `serde_saphyr` error for manifest `name` into a [`ManifestError`].
#[must_use]
pub fn map_yaml_error(err: YamlError, src: &str, name: &str) -> ManifestError {
    let location = err.location();
    let (line, column, span) = location.map_or((1, 1, None), |found| {
        (found.line(), found.column(), Some(span_at(src, found)))
    });
    let text = err.to_string();
    let help = hint_for(&text, src, location);
    let message = format!("YAML parse error at line {line}, column {column}: {text}");
    ManifestError::Parse {
        source: Box::new(YamlDiagnostic {
            src: NamedSource::new(name, src.to_owned()),
            span,
            help,
            source: err,
            message,
        }),
    }
}
