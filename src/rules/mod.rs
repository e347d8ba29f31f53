//! Rules: the unit of work the engine schedules.
//!
//! A rule pairs an ordered list of prerequisite names with a task that
//! produces (or, for [`CleanRule`], removes) its target. The engine treats
//! every variant uniformly through the [`Rule`] trait:
//!
//! - [`TaskRule`] wraps a caller-supplied closure.
//! - [`CompileRule`] compiles one source file into an object.
//! - [`LinkRule`] links object files into a binary.
//! - [`CleanRule`] removes a list of files.
//!
//! # Examples
//!
//! ```
//! use vrog::rules::{Rule, TaskRule};
//!
//! let rule = TaskRule::new(["a.c"], |_rule, _target, _ctx| Ok(()))?;
//! assert_eq!(rule.prerequisites(), ["a.c"]);
//! # Ok::<(), vrog::BuildError>(())
//! ```

mod clean;
mod compile;
mod depfile;
mod link;
mod task;

pub use clean::CleanRule;
pub use compile::{CompileRule, CompilerConfig};
pub use depfile::{extract_dependencies, parse_make_rule};
pub use link::{LinkRule, LinkerConfig};
pub use task::{Task, TaskRule};

use crate::context::BuildContext;
use crate::error::{BuildError, CommandError};
use crate::process::CommandLine;
use std::fmt;

/// Kind of rule, used for listings and graph labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Generic closure-backed rule.
    Task,
    /// Compile one source into an object.
    Compile,
    /// Link objects into a binary.
    Link,
    /// Remove files.
    Clean,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Task => "task",
            Self::Compile => "compile",
            Self::Link => "link",
            Self::Clean => "clean",
        })
    }
}

/// Prerequisites plus a task producing a target from them.
pub trait Rule: Send + Sync {
    /// Names this rule depends on, in declaration order.
    fn prerequisites(&self) -> &[String];

    /// Produce `target`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] when the work fails; the engine aborts the
    /// current build with it.
    fn run(&self, target: &str, ctx: &BuildContext) -> Result<(), BuildError>;

    /// Which variant this rule is.
    fn kind(&self) -> RuleKind;
}

/// Reject empty names in a list of prerequisites or files.
pub(crate) fn validate_names(what: &str, names: &[String]) -> Result<(), BuildError> {
    match names.iter().position(String::is_empty) {
        Some(index) => Err(BuildError::invalid_argument(format!(
            "{what} entry {index} is an empty name"
        ))),
        None => Ok(()),
    }
}

/// Reject an empty program name.
pub(crate) fn validate_program(what: &str, program: &str) -> Result<(), BuildError> {
    if program.trim().is_empty() {
        Err(BuildError::invalid_argument(format!(
            "{what} program must not be empty"
        )))
    } else {
        Ok(())
    }
}

/// Run `command` for `target`, wrapping failures as
/// [`BuildError::ExternalCommandFailed`].
pub(crate) fn run_command(
    ctx: &BuildContext,
    target: &str,
    command: &CommandLine,
) -> Result<(), BuildError> {
    ctx.runner()
        .run(command)
        .map_err(|source| command_failed(target, command, source))
}

pub(crate) fn command_failed(
    target: &str,
    command: &CommandLine,
    source: CommandError,
) -> BuildError {
    BuildError::ExternalCommandFailed {
        target: target.to_owned(),
        command: command.to_string(),
        source,
    }
}

/// Append `prefix` to each value, producing flags such as `-Wall`.
fn prefixed<'a>(prefix: &'a str, values: &'a [String]) -> impl Iterator<Item = String> + 'a {
    values.iter().map(move |value| format!("{prefix}{value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[], true)]
    #[case(&["a.c", "a.h"], true)]
    #[case(&["a.c", ""], false)]
    fn names_must_not_be_empty(#[case] names: &[&str], #[case] valid: bool) {
        let owned: Vec<String> = names.iter().map(|name| (*name).to_owned()).collect();
        assert_eq!(validate_names("prerequisite", &owned).is_ok(), valid);
    }

    #[rstest]
    #[case("cc", true)]
    #[case("", false)]
    #[case("   ", false)]
    fn programs_must_not_be_blank(#[case] program: &str, #[case] valid: bool) {
        assert_eq!(validate_program("compiler", program).is_ok(), valid);
    }
}
