//! Generic rule backed by a caller-supplied closure.

use super::{Rule, RuleKind, validate_names};
use crate::context::BuildContext;
use crate::error::BuildError;
use std::fmt;

/// Task signature: the owning rule, the target name and the build context.
pub type Task = dyn Fn(&TaskRule, &str, &BuildContext) -> Result<(), BuildError> + Send + Sync;

/// Rule for handwritten targets: custom commands, aggregates, anything the
/// specialised variants do not cover.
pub struct TaskRule {
    prerequisites: Vec<String>,
    task: Box<Task>,
}

impl TaskRule {
    /// Create a rule from prerequisites and a task.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidArgument`] when a prerequisite name is
    /// empty.
    pub fn new<I, S, F>(names: I, task: F) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Self, &str, &BuildContext) -> Result<(), BuildError> + Send + Sync + 'static,
    {
        let prerequisites: Vec<String> = names.into_iter().map(Into::into).collect();
        validate_names("prerequisite", &prerequisites)?;
        Ok(Self {
            prerequisites,
            task: Box::new(task),
        })
    }

    /// Create a rule whose task does nothing, useful for aggregate targets
    /// that only group prerequisites.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidArgument`] when a prerequisite name is
    /// empty.
    pub fn aggregate<I, S>(names: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names, |_, _, _| Ok(()))
    }
}

impl Rule for TaskRule {
    fn prerequisites(&self) -> &[String] {
        &self.prerequisites
    }

    fn run(&self, target: &str, ctx: &BuildContext) -> Result<(), BuildError> {
        (self.task)(self, target, ctx)
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Task
    }
}

impl fmt::Debug for TaskRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRule")
            .field("prerequisites", &self.prerequisites)
            .finish_non_exhaustive()
    }
}
