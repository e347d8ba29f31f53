//! Runners and reporters that record what a build asked of them.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use vrog::CommandError;
use vrog::process::{CommandLine, CommandRunner};
use vrog::report::BuildReporter;

use crate::MemoryFileSystem;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reporter recording started tasks and removed files.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    started: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
}

impl RecordingReporter {
    /// Targets whose task started, in order.
    #[must_use]
    pub fn started(&self) -> Vec<String> {
        lock(&self.started).clone()
    }

    /// Files removed by clean rules, in order.
    #[must_use]
    pub fn removed(&self) -> Vec<String> {
        lock(&self.removed).clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        lock(&self.started).clear();
        lock(&self.removed).clear();
    }
}

impl BuildReporter for RecordingReporter {
    fn task_started(&self, target: &str) {
        lock(&self.started).push(target.to_owned());
    }

    fn file_removed(&self, path: &str) {
        lock(&self.removed).push(path.to_owned());
    }
}

/// Runner that pretends to be a compiler driver.
///
/// `run` records the command and touches the file following `-o` in the
/// shared [`MemoryFileSystem`]. `output` answers `-MM` queries with the
/// configured dependency line for the source (the last argument), or
/// `<source>.o: <source>` when none was configured.
#[derive(Debug)]
pub struct RecordingRunner {
    fs: Arc<MemoryFileSystem>,
    commands: Mutex<Vec<String>>,
    dependencies: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingRunner {
    /// Runner touching outputs in `fs`.
    #[must_use]
    pub fn new(fs: Arc<MemoryFileSystem>) -> Self {
        Self {
            fs,
            commands: Mutex::new(Vec::new()),
            dependencies: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Answer dependency queries for `source` with `rule`, a make rule such
    /// as `a.o: a.c a.h`.
    pub fn set_dependencies(&self, source: &str, rule: &str) {
        lock(&self.dependencies).insert(source.to_owned(), rule.to_owned());
    }

    /// Make every command producing `output` exit with status 1.
    pub fn fail_output(&self, output: &str) {
        lock(&self.failing).insert(output.to_owned());
    }

    /// Every command seen so far, rendered as text.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        lock(&self.commands).clone()
    }

    /// Forget recorded commands.
    pub fn clear(&self) {
        lock(&self.commands).clear();
    }

    fn record(&self, command: &CommandLine) {
        lock(&self.commands).push(command.to_string());
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandLine) -> Result<(), CommandError> {
        self.record(command);
        let output = command
            .arguments()
            .iter()
            .skip_while(|arg| *arg != "-o")
            .nth(1);
        if let Some(path) = output {
            if lock(&self.failing).contains(path) {
                return Err(CommandError::Exit {
                    status: Some(1),
                    stderr: format!("cannot produce {path}"),
                });
            }
            self.fs.touch(path);
        }
        Ok(())
    }

    fn output(&self, command: &CommandLine) -> Result<String, CommandError> {
        self.record(command);
        let source = command.arguments().last().cloned().unwrap_or_default();
        if lock(&self.failing).contains(&source) {
            return Err(CommandError::Exit {
                status: Some(1),
                stderr: format!("{source}: No such file or directory"),
            });
        }
        let configured = lock(&self.dependencies).get(&source).cloned();
        Ok(configured.unwrap_or_else(|| format!("{source}.o: {source}\n")))
    }
}
