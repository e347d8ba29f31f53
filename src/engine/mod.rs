//! The build engine: rule registry, cycle detection and the recursive
//! "build if stale" walk.
//!
//! Rules are registered by target name. A name that appears only as a
//! prerequisite is a leaf, assumed to be a source file already on disk.
//! [`Engine::build`] rejects unknown targets and cycles up front, builds
//! registered prerequisites first (post-order), then runs the target's task
//! when the target is missing or older than one of its prerequisites.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use vrog::{BuildContext, Engine};
//! use vrog::fs::HostFileSystem;
//! use vrog::process::ProcessRunner;
//! use vrog::report::SilentReporter;
//! use vrog::rules::TaskRule;
//!
//! let ctx = BuildContext::new(
//!     Arc::new(HostFileSystem),
//!     Arc::new(ProcessRunner),
//!     Arc::new(SilentReporter),
//! );
//! let mut engine = Engine::new(ctx);
//! engine.register("all", TaskRule::aggregate(["a.c.o"])?)?;
//! assert!(engine.lookup("all").is_some());
//! assert!(engine.lookup("a.c.o").is_none());
//! assert!(!engine.has_cycle("all"));
//! # Ok::<(), vrog::BuildError>(())
//! ```

mod cycle;

use std::collections::HashSet;
use std::fmt;
use std::time::SystemTime;

use camino::Utf8Path;
use indexmap::IndexMap;
use tracing::debug;

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::rules::{
    CleanRule, CompileRule, CompilerConfig, LinkRule, LinkerConfig, Rule, RuleKind,
    validate_names,
};

/// Name of the target registered by [`Engine::add_clean`].
pub const CLEAN_TARGET: &str = "clean";

/// Object file produced for `source` by [`Engine::add_ctarget`].
///
/// # Examples
///
/// ```
/// assert_eq!(vrog::engine::object_name("src/main.c"), "src/main.c.o");
/// ```
#[must_use]
pub fn object_name(source: &str) -> String {
    format!("{source}.o")
}

/// Why a target's task must run.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Staleness {
    Missing,
    Outdated { prerequisite: String },
    UpToDate,
}

/// Registry of rules keyed by target name, plus the collaborators used to
/// build them.
///
/// Registration needs `&mut self`; building only needs `&self`, so a fully
/// populated engine can be shared between threads.
pub struct Engine {
    rules: IndexMap<String, Box<dyn Rule>>,
    context: BuildContext,
}

impl Engine {
    /// Create an empty engine using `context` for filesystem queries,
    /// processes and notifications.
    #[must_use]
    pub fn new(context: BuildContext) -> Self {
        Self {
            rules: IndexMap::new(),
            context,
        }
    }

    /// Register `rule` as the way to build `target`, replacing any previous
    /// rule for the same name.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidArgument`] when `target` is empty or the
    /// rule lists an empty prerequisite name.
    pub fn register<R>(&mut self, target: impl Into<String>, rule: R) -> Result<(), BuildError>
    where
        R: Rule + 'static,
    {
        let name: String = target.into();
        if name.is_empty() {
            return Err(BuildError::invalid_argument("target name must not be empty"));
        }
        validate_names("prerequisite", rule.prerequisites())?;
        debug!(kind = %rule.kind(), "registering rule for {name}");
        if self.rules.insert(name, Box::new(rule)).is_some() {
            debug!("replaced an existing rule");
        }
        Ok(())
    }

    /// Return the rule registered for `target`, or `None` for a leaf.
    #[must_use]
    pub fn lookup(&self, target: &str) -> Option<&dyn Rule> {
        self.rules.get(target).map(Box::as_ref)
    }

    /// Registered target names in registration order.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Registered targets with their rules, in registration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &dyn Rule)> {
        self.rules
            .iter()
            .map(|(name, rule)| (name.as_str(), rule.as_ref()))
    }

    /// Number of registered targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a cycle is reachable from `target`.
    #[must_use]
    pub fn has_cycle(&self, target: &str) -> bool {
        self.find_cycle(target).is_some()
    }

    /// Return the first cycle reachable from `target`, as a path whose first
    /// and last names are equal.
    #[must_use]
    pub fn find_cycle(&self, target: &str) -> Option<Vec<String>> {
        cycle::find_cycle(&self.rules, target)
    }

    /// Build `target`, running only the tasks whose targets are stale.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownTarget`] when `target` has no rule,
    /// [`BuildError::CyclicDependency`] when a cycle is reachable from it
    /// (no task runs in either case), and any error raised by a task or a
    /// filesystem query. Files produced before the failure stay on disk.
    pub fn build(&self, target: &str) -> Result<(), BuildError> {
        if !self.rules.contains_key(target) {
            return Err(BuildError::UnknownTarget {
                target: target.to_owned(),
            });
        }
        if let Some(cycle) = self.find_cycle(target) {
            return Err(BuildError::CyclicDependency {
                target: target.to_owned(),
                cycle,
            });
        }
        let mut visited = HashSet::new();
        self.build_target(target, &mut visited)
    }

    /// Build each of `targets` in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`Engine::build`].
    pub fn build_all<I, S>(&self, targets: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        targets
            .into_iter()
            .try_for_each(|target| self.build(target.as_ref()))
    }

    fn build_target<'a>(
        &'a self,
        target: &str,
        visited: &mut HashSet<&'a str>,
    ) -> Result<(), BuildError> {
        let Some((name, rule)) = self.rules.get_key_value(target) else {
            return Ok(());
        };
        if !visited.insert(name.as_str()) {
            debug!("{target} already handled in this build");
            return Ok(());
        }

        for dep in rule.prerequisites() {
            if self.rules.contains_key(dep) {
                self.build_target(dep, visited)?;
            }
        }

        match self.staleness(target, rule.prerequisites())? {
            Staleness::UpToDate => {
                debug!("{target} is up to date");
                return Ok(());
            }
            Staleness::Missing => debug!("{target} does not exist"),
            Staleness::Outdated { prerequisite } => {
                debug!("{target} is older than {prerequisite}");
            }
        }
        self.context.reporter().task_started(target);
        rule.run(target, &self.context)
    }

    /// Decide whether `target` must be rebuilt. The first prerequisite found
    /// to be newer decides; remaining prerequisites are not inspected.
    fn staleness(&self, target: &str, prerequisites: &[String]) -> Result<Staleness, BuildError> {
        let Some(built) = self.modified(target)? else {
            return Ok(Staleness::Missing);
        };
        for dep in prerequisites {
            // A missing prerequisite cannot make the target stale.
            if let Some(changed) = self.modified(dep)?
                && changed > built
            {
                return Ok(Staleness::Outdated {
                    prerequisite: dep.clone(),
                });
            }
        }
        Ok(Staleness::UpToDate)
    }

    fn modified(&self, name: &str) -> Result<Option<SystemTime>, BuildError> {
        let path = Utf8Path::new(name);
        self.context
            .fs()
            .modified(path)
            .map_err(|source| BuildError::Io {
                path: path.to_owned(),
                source,
            })
    }

    /// Register an executable built from C sources.
    ///
    /// Registers a link rule for `binary` over `source.o` for every source,
    /// and one compile rule per source. Dependencies of every source are
    /// extracted before anything is registered, so a failure leaves the
    /// registry untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidArgument`] for an empty binary name, an
    /// empty source list or invalid configuration, and
    /// [`BuildError::ExternalCommandFailed`] when dependency extraction
    /// fails.
    pub fn add_ctarget<S>(
        &mut self,
        binary: &str,
        sources: &[S],
        compiler: &CompilerConfig,
        linker: &LinkerConfig,
    ) -> Result<(), BuildError>
    where
        S: AsRef<str>,
    {
        if binary.is_empty() {
            return Err(BuildError::invalid_argument("binary name must not be empty"));
        }
        if sources.is_empty() {
            return Err(BuildError::invalid_argument(format!(
                "executable `{binary}` needs at least one source file"
            )));
        }
        compiler.validate()?;
        let objects: Vec<String> = sources
            .iter()
            .map(|source| object_name(source.as_ref()))
            .collect();
        let link = LinkRule::new(objects.iter().cloned(), linker.clone())?;
        let compiles = sources
            .iter()
            .zip(&objects)
            .map(|(source, object)| {
                CompileRule::new(source.as_ref(), compiler.clone(), self.context.runner())
                    .map(|rule| (object.clone(), rule))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.register(binary, link)?;
        for (object, rule) in compiles {
            self.register(object, rule)?;
        }
        Ok(())
    }

    /// Register [`CLEAN_TARGET`], removing every target registered so far.
    ///
    /// A previous clean rule is replaced. Any other rule already registered
    /// as [`CLEAN_TARGET`] is kept and reported as an error.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidArgument`] when [`CLEAN_TARGET`] is
    /// already taken by a rule that is not a clean rule.
    pub fn add_clean(&mut self) -> Result<(), BuildError> {
        if let Some(existing) = self.rules.get(CLEAN_TARGET)
            && existing.kind() != RuleKind::Clean
        {
            return Err(BuildError::invalid_argument(format!(
                "target `{CLEAN_TARGET}` is already defined; rename it or disable clean"
            )));
        }
        let files: Vec<&str> = self
            .targets()
            .filter(|target| *target != CLEAN_TARGET)
            .collect();
        let rule = CleanRule::new(files)?;
        self.register(CLEAN_TARGET, rule)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(BuildContext::host())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("targets", &self.rules.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::TaskRule;

    fn engine() -> Engine {
        Engine::default()
    }

    #[test]
    fn empty_target_names_are_rejected() {
        let err = engine()
            .register("", TaskRule::aggregate(Vec::<String>::new()).expect("rule"))
            .expect_err("empty target");
        assert!(matches!(err, BuildError::InvalidArgument { .. }));
    }

    #[test]
    fn registration_overwrites_and_keeps_order() {
        let mut engine = engine();
        engine
            .register("b", TaskRule::aggregate(["x"]).expect("rule"))
            .expect("register");
        engine
            .register("a", TaskRule::aggregate(["y"]).expect("rule"))
            .expect("register");
        engine
            .register("b", TaskRule::aggregate(["z"]).expect("rule"))
            .expect("register");
        assert_eq!(engine.targets().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(
            engine.lookup("b").map(Rule::prerequisites),
            Some(&["z".to_owned()][..])
        );
    }

    #[test]
    fn unknown_targets_are_rejected() {
        let err = engine().build("nonexistent").expect_err("unknown");
        assert!(matches!(err, BuildError::UnknownTarget { target } if target == "nonexistent"));
    }

    #[test]
    fn add_clean_lists_registered_targets() {
        let mut engine = engine();
        engine
            .register("app", TaskRule::aggregate(["a.c.o"]).expect("rule"))
            .expect("register");
        engine
            .register("a.c.o", TaskRule::aggregate(["a.c"]).expect("rule"))
            .expect("register");
        engine.add_clean().expect("clean");
        engine.add_clean().expect("clean twice");
        let rule = engine.lookup(CLEAN_TARGET).expect("clean rule");
        assert!(rule.prerequisites().is_empty());
        assert_eq!(engine.len(), 3);
    }

    #[test]
    fn add_clean_keeps_a_handwritten_clean_target() {
        let mut engine = engine();
        engine
            .register(CLEAN_TARGET, TaskRule::aggregate(["dist"]).expect("rule"))
            .expect("register");
        let err = engine.add_clean().expect_err("name taken");
        assert!(matches!(err, BuildError::InvalidArgument { .. }));
        let rule = engine.lookup(CLEAN_TARGET).expect("handwritten rule");
        assert_eq!(rule.kind(), RuleKind::Task);
    }

    #[test]
    fn engine_is_shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}
