//! Remove build artefacts.

use super::{Rule, RuleKind, validate_names};
use crate::context::BuildContext;
use crate::error::BuildError;
use camino::Utf8Path;
use tracing::debug;

/// Rule removing a fixed list of files. It has no prerequisites, so a clean
/// target that does not exist on disk always runs.
#[derive(Debug, Clone)]
pub struct CleanRule {
    files: Vec<String>,
}

impl CleanRule {
    /// Create a clean rule for `files`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidArgument`] when a file name is empty.
    pub fn new<I, S>(files: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = files.into_iter().map(Into::into).collect();
        validate_names("clean file", &names)?;
        Ok(Self { files: names })
    }
}

impl Rule for CleanRule {
    fn prerequisites(&self) -> &[String] {
        &[]
    }

    fn run(&self, _target: &str, ctx: &BuildContext) -> Result<(), BuildError> {
        for file in &self.files {
            let path = Utf8Path::new(file);
            let removed = ctx
                .fs()
                .remove_file(path)
                .map_err(|source| BuildError::Io {
                    path: path.to_owned(),
                    source,
                })?;
            if removed {
                ctx.reporter().file_removed(file);
            } else {
                debug!(file = %file, "nothing to remove");
            }
        }
        Ok(())
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Clean
    }
}
