//! Process execution for compiler, linker and shell tasks.
//!
//! Commands are argument vectors rather than shell strings so arguments never
//! need quoting. Manifest command targets opt into a shell explicitly through
//! [`CommandLine::shell`].

use crate::error::CommandError;
use std::fmt;
use std::process::{Command, Output, Stdio};
use tracing::info;

#[cfg(windows)]
const SHELL: &str = "cmd";
#[cfg(windows)]
const SHELL_ARGS: &[&str] = &["/C"];

#[cfg(not(windows))]
const SHELL: &str = "sh";
#[cfg(not(windows))]
const SHELL_ARGS: &[&str] = &["-c"];

/// A program plus its argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    /// Start a command line for `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Run `script` through the platform shell.
    #[must_use]
    pub fn shell(script: impl Into<String>) -> Self {
        let mut command = Self::new(SHELL);
        command.args(SHELL_ARGS.iter().copied());
        command.arg(script);
        command
    }

    /// Append one argument.
    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Append every argument yielded by `args`.
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The program to execute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external programs on behalf of rules.
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion with inherited standard streams.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the process cannot be spawned or exits
    /// unsuccessfully.
    fn run(&self, command: &CommandLine) -> Result<(), CommandError>;

    /// Run `command` and return its standard output as text.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the process cannot be spawned, exits
    /// unsuccessfully, or prints non UTF-8 output.
    fn output(&self, command: &CommandLine) -> Result<String, CommandError>;
}

/// [`CommandRunner`] that spawns real processes and blocks until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &CommandLine) -> Result<(), CommandError> {
        info!("Running command: {command}");
        let status = command
            .to_command()
            .status()
            .map_err(|source| spawn_error(command, source))?;
        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Exit {
                status: status.code(),
                stderr: String::new(),
            })
        }
    }

    fn output(&self, command: &CommandLine) -> Result<String, CommandError> {
        info!("Running command: {command}");
        let Output {
            status,
            stdout,
            stderr,
        } = command
            .to_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|source| spawn_error(command, source))?;
        if !status.success() {
            return Err(CommandError::Exit {
                status: status.code(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            });
        }
        String::from_utf8(stdout).map_err(|_| CommandError::InvalidUtf8)
    }
}

fn spawn_error(command: &CommandLine, source: std::io::Error) -> CommandError {
    CommandError::Spawn {
        program: command.program.clone(),
        source,
    }
}
