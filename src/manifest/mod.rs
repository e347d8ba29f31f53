//! Manifest loading.
//!
//! A `Vrogfile` is YAML describing the compiler and linker settings, the
//! executables to build from C sources, handwritten targets and the default
//! targets. [`from_path`] parses it into a [`VrogManifest`] and
//! [`populate`] turns that into rules on an [`Engine`](crate::Engine).
//!
//! ```
//! use vrog::manifest;
//!
//! let manifest = manifest::from_str(
//!     "vrog_version: \"1.0.0\"\ntargets:\n  - name: all\n    deps: [a.txt]\n",
//! )?;
//! assert_eq!(manifest.targets[0].deps.clone().into_vec(), ["a.txt"]);
//! # Ok::<(), vrog::manifest::ManifestError>(())
//! ```

use camino::Utf8Path;
use std::fs;

mod ast;
mod command;
mod diagnostics;
mod glob;
mod register;

pub use ast::{CompilerSection, Executable, LinkerSection, StringOrList, Target, VrogManifest};
pub use command::interpolate_command;
pub use diagnostics::{ManifestError, map_yaml_error};
pub use glob::expand_sources;
pub use register::{populate, populate_with_env};

/// Default manifest file name.
pub const DEFAULT_MANIFEST: &str = "Vrogfile";

/// Major manifest format version understood by this build.
pub const SUPPORTED_MAJOR: u64 = 1;

/// Parse a manifest from YAML text.
///
/// # Errors
///
/// Returns [`ManifestError::Parse`] for malformed YAML or unknown keys, and
/// [`ManifestError::UnsupportedVersion`] when `vrog_version` has a different
/// major version.
pub fn from_str(yaml: &str) -> Result<VrogManifest, ManifestError> {
    from_str_named(yaml, DEFAULT_MANIFEST)
}

/// Load a manifest from `path`.
///
/// # Errors
///
/// Returns [`ManifestError::Read`] when the file cannot be read, otherwise
/// the errors of [`from_str`].
pub fn from_path(path: &Utf8Path) -> Result<VrogManifest, ManifestError> {
    let data = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_owned(),
        source,
    })?;
    from_str_named(&data, path.as_str())
}

fn from_str_named(yaml: &str, name: &str) -> Result<VrogManifest, ManifestError> {
    let manifest: VrogManifest =
        serde_saphyr::from_str(yaml).map_err(|err| map_yaml_error(err, yaml, name))?;
    if manifest.vrog_version.major != SUPPORTED_MAJOR {
        return Err(ManifestError::UnsupportedVersion {
            found: manifest.vrog_version,
            supported: SUPPORTED_MAJOR,
        });
    }
    Ok(manifest)
}
