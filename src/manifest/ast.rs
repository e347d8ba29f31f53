//! Vrog manifest structures.
//!
//! These types mirror the YAML schema of a `Vrogfile` and are deserialised
//! with `serde_saphyr`. Unknown keys are rejected so typos surface as parse
//! errors rather than silently ignored settings.
//!
//! ```rust
//! use vrog::manifest::VrogManifest;
//!
//! let yaml = "vrog_version: \"1.0.0\"\nexecutables:\n  - name: app\n    sources: [main.c]";
//! let manifest: VrogManifest = serde_saphyr::from_str(yaml)?;
//! assert_eq!(manifest.executables[0].name, "app");
//! assert!(manifest.clean);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::rules::{CompilerConfig, LinkerConfig};

const fn default_clean() -> bool {
    true
}

/// Top-level manifest structure parsed from a `Vrogfile`.
///
/// ```yaml
/// vrog_version: "1.0.0"
/// compiler:
///   std: c11
///   warnings: [all]
/// executables:
///   - name: example.out
///     sources: [main.c, "lib/*.c"]
/// defaults: [example.out]
/// ```
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VrogManifest {
    /// Semantic version of the manifest format.
    pub vrog_version: Version,

    /// How sources are compiled.
    #[serde(default)]
    pub compiler: CompilerSection,

    /// How objects are linked.
    #[serde(default)]
    pub linker: LinkerSection,

    /// Binaries built from C sources.
    #[serde(default)]
    pub executables: Vec<Executable>,

    /// Handwritten targets with an optional shell command.
    #[serde(default)]
    pub targets: Vec<Target>,

    /// Targets built when the command line names none.
    #[serde(default)]
    pub defaults: Vec<String>,

    /// Whether to register a `clean` target removing every other target.
    #[serde(default = "default_clean")]
    pub clean: bool,
}

/// Compiler settings; `program` falls back to `$CC`, then `cc`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerSection {
    /// Compiler driver to run.
    pub program: Option<String>,
    /// Language standard, rendered as `-std=<std>`.
    pub std: Option<String>,
    /// Optimisation level, rendered as `-O<level>`.
    pub optimization: Option<String>,
    /// Warning names, each rendered as `-W<name>`.
    pub warnings: Vec<String>,
    /// Preprocessor definitions, each rendered as `-D<define>`.
    pub defines: Vec<String>,
    /// Extra arguments passed through unchanged.
    pub flags: Vec<String>,
}

impl CompilerSection {
    /// Resolve into a [`CompilerConfig`], using `default_program` when the
    /// manifest names none.
    #[must_use]
    pub fn resolve(self, default_program: &str) -> CompilerConfig {
        CompilerConfig {
            program: self.program.unwrap_or_else(|| default_program.to_owned()),
            std: self.std,
            optimization: self.optimization,
            warnings: self.warnings,
            defines: self.defines,
            flags: self.flags,
        }
    }
}

/// Linker settings; `program` falls back to `$CC`, then `cc`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkerSection {
    /// Linker driver to run.
    pub program: Option<String>,
    /// Libraries, each rendered as `-l<name>`.
    pub libraries: Vec<String>,
    /// Linker flags, each rendered as `-Wl,<flag>`.
    pub linker_flags: Vec<String>,
    /// Extra arguments passed through unchanged.
    pub flags: Vec<String>,
}

impl LinkerSection {
    /// Resolve into a [`LinkerConfig`], using `default_program` when the
    /// manifest names none.
    #[must_use]
    pub fn resolve(self, default_program: &str) -> LinkerConfig {
        LinkerConfig {
            program: self.program.unwrap_or_else(|| default_program.to_owned()),
            libraries: self.libraries,
            linker_flags: self.linker_flags,
            flags: self.flags,
        }
    }
}

/// A binary compiled and linked from C sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Executable {
    /// Output binary.
    pub name: String,
    /// Source files or glob patterns.
    pub sources: StringOrList,
}

/// A handwritten target.
///
/// With a `command`, the target runs it through the shell; `$in` expands to
/// the prerequisites and `$out` to the target. Without one, the target only
/// groups its prerequisites.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Target name.
    pub name: String,
    /// Prerequisites, in order.
    #[serde(default)]
    pub deps: StringOrList,
    /// Shell command producing the target.
    pub command: Option<String>,
}

/// A helper for fields that accept either a single string or a list of
/// strings.
///
/// It mirrors YAML syntax where a scalar or sequence is allowed. Empty values
/// deserialize to `StringOrList::Empty`.
///
/// ```yaml
/// # Scalar
/// deps: main.c
/// # Sequence
/// deps:
///   - main.c
///   - util.c
/// ```
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StringOrList {
    /// No value provided.
    #[default]
    Empty,
    /// A single string item.
    String(String),
    /// A list of string items.
    List(Vec<String>),
}

impl StringOrList {
    /// Flatten into a list of strings.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Empty => Vec::new(),
            Self::String(item) => vec![item],
            Self::List(items) => items,
        }
    }
}
