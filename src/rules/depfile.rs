//! Dependency extraction through the compiler's make-rule output.
//!
//! The compiler is asked for the make rule of a single source (`-MM`), which
//! looks like:
//!
//! ```text
//! main.o: main.c util.h \
//!   config.h
//! ```
//!
//! The first logical line is joined across backslash continuations, the make
//! target is dropped and the remaining words are returned. The source itself
//! is always the first dependency the compiler lists.

use super::{CompilerConfig, command_failed};
use crate::error::{BuildError, CommandError};
use crate::process::{CommandLine, CommandRunner};
use tracing::debug;

/// Ask the configured compiler for the dependencies of `source`.
///
/// The result lists `source` first followed by the headers it includes.
///
/// # Errors
///
/// Returns [`BuildError::ExternalCommandFailed`] when the compiler cannot be
/// run, exits unsuccessfully, or prints output that is not a make rule.
pub fn extract_dependencies(
    source: &str,
    config: &CompilerConfig,
    runner: &dyn CommandRunner,
) -> Result<Vec<String>, BuildError> {
    let command = config.dependency_command(source);
    let output = runner
        .output(&command)
        .map_err(|err| command_failed(source, &command, err))?;
    let deps = parse_make_rule(&output).map_err(|err| command_failed(source, &command, err))?;
    debug!(source, ?deps, "extracted dependencies");
    Ok(deps)
}

/// Parse the first make rule in `output` into its prerequisite list.
///
/// # Errors
///
/// Returns [`CommandError::InvalidOutput`] when the output is empty or the
/// first line has no `target:` separator.
///
/// # Examples
///
/// ```
/// use vrog::rules::parse_make_rule;
///
/// let deps = parse_make_rule("a.o: a.c \\\n a.h\n")?;
/// assert_eq!(deps, ["a.c", "a.h"]);
/// # Ok::<(), vrog::CommandError>(())
/// ```
pub fn parse_make_rule(output: &str) -> Result<Vec<String>, CommandError> {
    let line = first_logical_line(output);
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(invalid_output("compiler printed no dependency rule"));
    };
    let rest: Vec<&str> = words.collect();
    let deps = if head.ends_with(':') {
        rest.as_slice()
    } else {
        match rest.split_first() {
            Some((&":", tail)) => tail,
            _ => {
                return Err(invalid_output(format!(
                    "expected `target:` at the start of `{line}`"
                )));
            }
        }
    };
    Ok(deps.iter().map(|dep| (*dep).to_owned()).collect())
}

fn first_logical_line(output: &str) -> String {
    let mut joined = String::new();
    for line in output.lines() {
        match line.strip_suffix('\\') {
            Some(continued) => {
                joined.push_str(continued);
                joined.push(' ');
            }
            None => {
                joined.push_str(line);
                break;
            }
        }
    }
    joined
}

fn invalid_output(reason: impl Into<String>) -> CommandError {
    CommandError::InvalidOutput {
        reason: reason.into(),
    }
}
