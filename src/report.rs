//! Console notification of build progress.
//!
//! The engine announces each target before its task runs and the clean rule
//! announces each removed file. Reporters never fail a build: output errors
//! are discarded.

use std::io::{self, Write};

/// Receives build progress notifications.
pub trait BuildReporter: Send + Sync {
    /// A target's task is about to run.
    fn task_started(&self, target: &str);

    /// The clean rule removed `path`.
    fn file_removed(&self, path: &str);
}

/// Reporter that writes one line per event to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl BuildReporter for ConsoleReporter {
    fn task_started(&self, target: &str) {
        // Status output failures should not abort the build.
        drop(writeln!(io::stdout(), "building {target}"));
    }

    fn file_removed(&self, path: &str) {
        drop(writeln!(io::stdout(), "removed {path}"));
    }
}

/// Silent reporter: emits nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl BuildReporter for SilentReporter {
    fn task_started(&self, _target: &str) {}
    fn file_removed(&self, _path: &str) {}
}
