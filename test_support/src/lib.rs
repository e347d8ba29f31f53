//! Test utilities shared by the integration tests.
//!
//! [`MemoryFileSystem`] models files as names with logical timestamps, and
//! [`RecordingRunner`]/[`RecordingReporter`] capture what a build did so
//! scenarios can assert on task order without spawning compilers. The
//! [`exec`] helpers write executable stubs, including a fake `cc`, for
//! end-to-end CLI tests.

pub mod exec;
pub mod memory_fs;
pub mod recording;

pub use exec::{FAKE_CC_LOG, fake_cc, make_executable, write_exec, write_script};
pub use memory_fs::MemoryFileSystem;
pub use recording::{RecordingReporter, RecordingRunner};

use std::sync::Arc;
use vrog::BuildContext;

/// Collaborators for an in-memory build, with handles kept for assertions.
#[derive(Debug, Clone)]
pub struct Harness {
    /// Files known to the build.
    pub fs: Arc<MemoryFileSystem>,
    /// Commands the build ran.
    pub runner: Arc<RecordingRunner>,
    /// Tasks the build started.
    pub reporter: Arc<RecordingReporter>,
}

impl Harness {
    /// Fresh harness whose runner touches command outputs in `fs`.
    #[must_use]
    pub fn new() -> Self {
        let fs = Arc::new(MemoryFileSystem::new());
        Self {
            runner: Arc::new(RecordingRunner::new(Arc::clone(&fs))),
            reporter: Arc::new(RecordingReporter::default()),
            fs,
        }
    }

    /// Build context wired to this harness.
    #[must_use]
    pub fn context(&self) -> BuildContext {
        BuildContext::new(
            Arc::clone(&self.fs) as _,
            Arc::clone(&self.runner) as _,
            Arc::clone(&self.reporter) as _,
        )
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
