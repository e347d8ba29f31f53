//! In-memory filesystem with a logical clock.

use camino::Utf8Path;
use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime};
use vrog::fs::FileSystem;

#[derive(Debug, Default)]
struct State {
    clock: u64,
    files: HashMap<String, SystemTime>,
}

/// [`FileSystem`] keeping modification times in memory.
///
/// Every [`touch`](Self::touch) advances a logical clock by one second, so a
/// file touched later is always strictly newer.
///
/// ```rust
/// use camino::Utf8Path;
/// use test_support::MemoryFileSystem;
/// use vrog::fs::FileSystem;
///
/// let fs = MemoryFileSystem::with_files(["a.c", "a.h"]);
/// let older = fs.modified(Utf8Path::new("a.c")).unwrap();
/// let newer = fs.modified(Utf8Path::new("a.h")).unwrap();
/// assert!(newer > older);
/// ```
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    state: Mutex<State>,
}

impl MemoryFileSystem {
    /// Empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filesystem containing `names`, touched in order.
    #[must_use]
    pub fn with_files<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fs = Self::new();
        for name in names {
            fs.touch(name.as_ref());
        }
        fs
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Create `name` or bump its modification time past every other file.
    pub fn touch(&self, name: &str) {
        let mut state = self.lock();
        state.clock += 1;
        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(state.clock);
        state.files.insert(name.to_owned(), stamp);
    }

    /// Whether `name` exists.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.lock().files.contains_key(name)
    }
}

impl FileSystem for MemoryFileSystem {
    fn modified(&self, path: &Utf8Path) -> io::Result<Option<SystemTime>> {
        Ok(self.lock().files.get(path.as_str()).copied())
    }

    fn remove_file(&self, path: &Utf8Path) -> io::Result<bool> {
        Ok(self.lock().files.remove(path.as_str()).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_makes_files_strictly_newer() {
        let fs = MemoryFileSystem::with_files(["a", "b"]);
        fs.touch("a");
        let a = fs.modified(Utf8Path::new("a")).expect("query");
        let b = fs.modified(Utf8Path::new("b")).expect("query");
        assert!(a > b);
    }

    #[test]
    fn removal_reports_presence() {
        let fs = MemoryFileSystem::with_files(["a"]);
        assert!(fs.remove_file(Utf8Path::new("a")).expect("remove"));
        assert!(!fs.remove_file(Utf8Path::new("a")).expect("remove"));
        assert!(!fs.exists("a"));
    }
}
