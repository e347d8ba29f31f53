//! Turn a parsed manifest into engine rules.

use std::env;

use tracing::debug;
use vrog_env::{COMPILER_ENV, DEFAULT_COMPILER};

use super::{ManifestError, VrogManifest, expand_sources, interpolate_command};
use crate::engine::Engine;
use crate::process::CommandLine;
use crate::rules::{TaskRule, run_command};

/// Register every rule described by `manifest` on `engine`, reading the
/// default compiler from the process environment.
///
/// # Errors
///
/// See [`populate_with_env`].
pub fn populate(engine: &mut Engine, manifest: VrogManifest) -> Result<(), ManifestError> {
    populate_with_env(engine, manifest, |name| env::var(name).ok())
}

/// Register every rule described by `manifest` on `engine`.
///
/// Executables come first, then handwritten targets in declaration order,
/// then the `clean` target when enabled. Compiler and linker programs not
/// named in the manifest come from `read_env(COMPILER_ENV)`, falling back to
/// `cc`.
///
/// # Errors
///
/// Returns [`ManifestError`] when a source pattern cannot be expanded, a
/// command is malformed, dependency extraction fails or a rule is invalid.
pub fn populate_with_env<F>(
    engine: &mut Engine,
    manifest: VrogManifest,
    read_env: F,
) -> Result<(), ManifestError>
where
    F: Fn(&str) -> Option<String>,
{
    let program = read_env(COMPILER_ENV)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COMPILER.to_owned());
    let compiler = manifest.compiler.resolve(&program);
    let linker = manifest.linker.resolve(&program);

    for executable in manifest.executables {
        let sources = expand_sources(&executable.sources.into_vec())?;
        debug!("executable {} from {} sources", executable.name, sources.len());
        engine.add_ctarget(&executable.name, &sources, &compiler, &linker)?;
    }

    for target in manifest.targets {
        let deps = target.deps.into_vec();
        let rule = match target.command {
            Some(template) => {
                let script = interpolate_command(&target.name, &template, &deps)?;
                TaskRule::new(deps, move |_rule, name, ctx| {
                    run_command(ctx, name, &CommandLine::shell(script.as_str()))
                })?
            }
            None => TaskRule::aggregate(deps)?,
        };
        engine.register(target.name, rule)?;
    }

    if manifest.clean {
        engine.add_clean()?;
    }
    Ok(())
}
