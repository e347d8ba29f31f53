//! Filesystem queries consumed by the engine and the clean rule.
//!
//! The engine only needs to know whether a file exists and when it was last
//! modified, and the clean rule needs to remove files. Both go through the
//! [`FileSystem`] trait so tests can substitute an in-memory world.

use camino::Utf8Path;
use std::io::{self, ErrorKind};
use std::time::SystemTime;

/// Existence, modification time and removal of build artefacts.
pub trait FileSystem: Send + Sync {
    /// Return the last-modified time of `path`, or `None` when it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be inspected.
    fn modified(&self, path: &Utf8Path) -> io::Result<Option<SystemTime>>;

    /// Remove `path`, returning `false` when it was already absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be removed.
    fn remove_file(&self, path: &Utf8Path) -> io::Result<bool>;
}

/// [`FileSystem`] backed by the host filesystem, relative to the process
/// working directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFileSystem;

impl FileSystem for HostFileSystem {
    fn modified(&self, path: &Utf8Path) -> io::Result<Option<SystemTime>> {
        match std::fs::metadata(path.as_std_path()) {
            Ok(metadata) => metadata.modified().map(Some),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn remove_file(&self, path: &Utf8Path) -> io::Result<bool> {
        match std::fs::remove_file(path.as_std_path()) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}
