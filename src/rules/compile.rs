//! Compile one source file into an object file.

use super::{
    Rule, RuleKind, extract_dependencies, prefixed, run_command, validate_names, validate_program,
};
use crate::context::BuildContext;
use crate::error::BuildError;
use crate::process::{CommandLine, CommandRunner};
use vrog_env::DEFAULT_COMPILER;

/// How to invoke the C compiler.
///
/// Values are rendered into flags when a command line is built: `std` as
/// `-std=<std>`, `optimization` as `-O<level>`, each warning as `-W<name>`
/// and each define as `-D<define>`. `flags` are passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Compiler driver to run.
    pub program: String,
    /// Language standard, e.g. `c11`.
    pub std: Option<String>,
    /// Optimisation level, e.g. `2` or `s`.
    pub optimization: Option<String>,
    /// Warning names, e.g. `all`.
    pub warnings: Vec<String>,
    /// Preprocessor definitions, e.g. `NDEBUG` or `LEVEL=2`.
    pub defines: Vec<String>,
    /// Extra arguments passed through unchanged.
    pub flags: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_COMPILER.to_owned(),
            std: None,
            optimization: None,
            warnings: Vec::new(),
            defines: Vec::new(),
            flags: Vec::new(),
        }
    }
}

impl CompilerConfig {
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
        validate_program("compiler", &self.program)?;
        validate_names("compiler warning", &self.warnings)?;
        validate_names("compiler define", &self.defines)?;
        validate_names("compiler flag", &self.flags)
    }

    /// Command compiling `source` into `object`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vrog::rules::CompilerConfig;
    ///
    /// let mut config = CompilerConfig::new("cc");
    /// config.optimization = Some("2".into());
    /// config.warnings = vec!["all".into()];
    /// let command = config.compile_command("a.c", "a.c.o");
    /// assert_eq!(command.to_string(), "cc -O2 -Wall -c a.c -o a.c.o");
    /// ```
    #[must_use]
    pub fn compile_command(&self, source: &str, object: &str) -> CommandLine {
        let mut command = CommandLine::new(&self.program);
        command
            .args(self.std.iter().map(|standard| format!("-std={standard}")))
            .args(self.optimization.iter().map(|level| format!("-O{level}")))
            .args(prefixed("-W", &self.warnings))
            .args(prefixed("-D", &self.defines))
            .args(self.flags.iter().cloned())
            .args(["-c", source, "-o", object]);
        command
    }

    /// Command listing the make-rule dependencies of `source`.
    #[must_use]
    pub fn dependency_command(&self, source: &str) -> CommandLine {
        let mut command = CommandLine::new(&self.program);
        command
            .arg("-MM")
            .args(self.std.iter().map(|standard| format!("-std={standard}")))
            .args(prefixed("-D", &self.defines))
            .args(self.flags.iter().cloned())
            .arg(source);
        command
    }
}

/// Rule compiling one source file.
///
/// Prerequisites are discovered once, at construction, by asking the
/// compiler which headers the source includes.
#[derive(Debug, Clone)]
pub struct CompileRule {
    source: String,
    config: CompilerConfig,
    prerequisites: Vec<String>,
}

impl CompileRule {
    /// Create a compile rule for `source`, extracting its dependencies with
    /// `runner`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidArgument`] for an empty source or an
    /// invalid configuration, and [`BuildError::ExternalCommandFailed`] when
    /// dependency extraction fails.
    pub fn new(
        source: impl Into<String>,
        config: CompilerConfig,
        runner: &dyn CommandRunner,
    ) -> Result<Self, BuildError> {
        let source_file: String = source.into();
        Self::validate(&source_file, &config)?;
        let prerequisites = extract_dependencies(&source_file, &config, runner)?;
        Ok(Self {
            source: source_file,
            config,
            prerequisites,
        })
    }

    /// Create a compile rule with an explicit prerequisite list, skipping
    /// dependency extraction.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidArgument`] for an empty source, empty
    /// prerequisite names, or an invalid configuration.
    pub fn with_prerequisites(
        source: impl Into<String>,
        config: CompilerConfig,
        prerequisites: Vec<String>,
    ) -> Result<Self, BuildError> {
        let source_file: String = source.into();
        Self::validate(&source_file, &config)?;
        validate_names("prerequisite", &prerequisites)?;
        Ok(Self {
            source: source_file,
            config,
            prerequisites,
        })
    }

    fn validate(source: &str, config: &CompilerConfig) -> Result<(), BuildError> {
        if source.is_empty() {
            return Err(BuildError::invalid_argument(
                "compile rule needs a source file",
            ));
        }
        config.validate()
    }

    /// The source file compiled by this rule.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Rule for CompileRule {
    fn prerequisites(&self) -> &[String] {
        &self.prerequisites
    }

    fn run(&self, target: &str, ctx: &BuildContext) -> Result<(), BuildError> {
        let command = self.config.compile_command(&self.source, target);
        run_command(ctx, target, &command)
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Compile
    }
}
