//! Link object files into a binary.

use super::{Rule, RuleKind, prefixed, run_command, validate_names, validate_program};
use crate::context::BuildContext;
use crate::error::BuildError;
use crate::process::CommandLine;
use vrog_env::DEFAULT_COMPILER;

/// How to invoke the linker.
///
/// Each library is rendered as `-l<name>` and each linker flag as
/// `-Wl,<flag>`. `flags` are passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkerConfig {
    /// Linker driver to run.
    pub program: String,
    /// Libraries to link, e.g. `m`.
    pub libraries: Vec<String>,
    /// Flags forwarded to the linker through the driver.
    pub linker_flags: Vec<String>,
    /// Extra arguments passed through unchanged.
    pub flags: Vec<String>,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_COMPILER.to_owned(),
            libraries: Vec::new(),
            linker_flags: Vec::new(),
            flags: Vec::new(),
        }
    }
}

impl LinkerConfig {
    /// Configuration invoking `program` with no extra flags.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Check the configuration once, before any rule uses it.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidArgument`] for an empty program or empty
    /// list entries.
    pub fn validate(&self) -> Result<(), BuildError> {
        validate_program("linker", &self.program)?;
        validate_names("library", &self.libraries)?;
        validate_names("linker flag", &self.linker_flags)?;
        validate_names("linker pass-through flag", &self.flags)
    }

    /// Command linking `objects` into `binary`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vrog::rules::LinkerConfig;
    ///
    /// let mut config = LinkerConfig::new("cc");
    /// config.libraries = vec!["m".into()];
    /// let objects = vec!["a.c.o".to_owned(), "b.c.o".to_owned()];
    /// let command = config.link_command(&objects, "app");
    /// assert_eq!(command.to_string(), "cc -lm a.c.o b.c.o -o app");
    /// ```
    #[must_use]
    pub fn link_command(&self, objects: &[String], binary: &str) -> CommandLine {
        let mut command = CommandLine::new(&self.program);
        command
            .args(prefixed("-l", &self.libraries))
            .args(prefixed("-Wl,", &self.linker_flags))
            .args(self.flags.iter().cloned())
            .args(objects.iter().cloned())
            .args(["-o", binary]);
        command
    }
}

/// Rule linking a fixed list of objects.
#[derive(Debug, Clone)]
pub struct LinkRule {
    objects: Vec<String>,
    config: LinkerConfig,
}

impl LinkRule {
    /// Create a link rule over `objects`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidArgument`] when `objects` is empty,
    /// contains an empty name, or the configuration is invalid.
    pub fn new<I, S>(objects: I, config: LinkerConfig) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = objects.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(BuildError::invalid_argument(
                "link rule needs at least one object file",
            ));
        }
        validate_names("object", &names)?;
        config.validate()?;
        Ok(Self {
            objects: names,
            config,
        })
    }
}

impl Rule for LinkRule {
    fn prerequisites(&self) -> &[String] {
        &self.objects
    }

    fn run(&self, target: &str, ctx: &BuildContext) -> Result<(), BuildError> {
        let command = self.config.link_command(&self.objects, target);
        run_command(ctx, target, &command)
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Link
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_command_orders_flags() {
        let config = LinkerConfig {
            program: "gcc".into(),
            libraries: vec!["m".into(), "pthread".into()],
            linker_flags: vec!["--as-needed".into()],
            flags: vec!["-static".into()],
        };
        let objects = vec!["a.c.o".to_owned(), "main.c.o".to_owned()];
        assert_eq!(
            config.link_command(&objects, "app").to_string(),
            "gcc -lm -lpthread -Wl,--as-needed -static a.c.o main.c.o -o app"
        );
    }

    #[test]
    fn prerequisites_are_exactly_the_objects() {
        let rule = LinkRule::new(["a.c.o", "b.c.o"], LinkerConfig::default()).expect("rule");
        assert_eq!(rule.prerequisites(), ["a.c.o", "b.c.o"]);
        assert_eq!(rule.kind(), RuleKind::Link);
    }

    #[test]
    fn empty_object_list_is_rejected() {
        let err = LinkRule::new(Vec::<String>::new(), LinkerConfig::default())
            .expect_err("no objects");
        assert!(matches!(err, BuildError::InvalidArgument { .. }));
    }
}
