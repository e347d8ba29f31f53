//! Collaborators shared by the engine and running tasks.

use crate::fs::{FileSystem, HostFileSystem};
use crate::process::{CommandRunner, ProcessRunner};
use crate::report::{BuildReporter, ConsoleReporter};
use std::fmt;
use std::sync::Arc;

/// Filesystem, process runner and reporter used during a build.
///
/// Cloning is cheap; all collaborators are reference counted and thread
/// safe.
#[derive(Clone)]
pub struct BuildContext {
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn CommandRunner>,
    reporter: Arc<dyn BuildReporter>,
}

impl BuildContext {
    /// Assemble a context from explicit collaborators.
    #[must_use]
    pub fn new(
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
        reporter: Arc<dyn BuildReporter>,
    ) -> Self {
        Self {
            fs,
            runner,
            reporter,
        }
    }

    /// Context wired to the host filesystem, real processes and stdout.
    #[must_use]
    pub fn host() -> Self {
        Self::new(
            Arc::new(HostFileSystem),
            Arc::new(ProcessRunner),
            Arc::new(ConsoleReporter),
        )
    }

    /// Replace the reporter, keeping the other collaborators.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn BuildReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Filesystem queried for existence and modification times.
    #[must_use]
    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Runner used for compiler, linker and shell commands.
    #[must_use]
    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    /// Reporter notified as tasks run.
    #[must_use]
    pub fn reporter(&self) -> &dyn BuildReporter {
        self.reporter.as_ref()
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::host()
    }
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext").finish_non_exhaustive()
    }
}
