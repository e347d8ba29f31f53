//! Helpers for creating executable stubs in tests.
//!
//! These utilities write tiny shell scripts and mark them executable so
//! tests can drive the CLI without depending on a real compiler. Callers own
//! the containing directory's lifetime to keep the stub on disk.
//!
//! # Examples
//!
//! ```rust
//! use camino::Utf8Path;
//! use tempfile::TempDir;
//! use test_support::write_exec;
//!
//! let temp = TempDir::new().expect("tempdir");
//! let root = Utf8Path::from_path(temp.path()).expect("utf8 path");
//! let path = write_exec(root, "tool").expect("stub executable");
//! assert!(path.exists());
//! ```

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Name of the log file, relative to the working directory, to which
/// [`fake_cc`] appends every compile and link command.
pub const FAKE_CC_LOG: &str = "cc.log";

const FAKE_CC: &str = r#"#!/bin/sh
# Stand-in compiler driver: answers -MM with the quoted local includes of
# the source and touches whatever follows -o.
out=""
src=""
mm=0
prev=""
for arg in "$@"; do
    if [ "$prev" = "-o" ]; then out="$arg"; fi
    case "$arg" in
        -MM) mm=1 ;;
        *.c) src="$arg" ;;
    esac
    prev="$arg"
done
if [ "$mm" = 1 ]; then
    [ -f "$src" ] || { echo "$src: No such file or directory" >&2; exit 1; }
    deps="$src"
    for header in $(sed -n 's/^#include "\(.*\)"$/\1/p' "$src"); do
        deps="$deps $header"
    done
    echo "${src%.c}.o: $deps"
    exit 0
fi
echo "$*" >> cc.log
if [ -n "$out" ]; then touch "$out"; fi
"#;

/// Write a minimal executable file named `name` inside `root`.
pub fn write_exec(root: &Utf8Path, name: &str) -> Result<Utf8PathBuf> {
    write_script(root, name, "#!/bin/sh\n")
}

/// Write `body` to `root/name` and mark it executable.
pub fn write_script(root: &Utf8Path, name: &str, body: &str) -> Result<Utf8PathBuf> {
    let path = root.join(name);
    fs::write(path.as_std_path(), body).with_context(|| format!("write exec stub {name}"))?;
    make_executable(&path)?;
    Ok(path)
}

/// Write the fake compiler driver into `root` and return its path.
///
/// The script logs each compile and link command to [`FAKE_CC_LOG`] in the
/// working directory.
pub fn fake_cc(root: &Utf8Path) -> Result<Utf8PathBuf> {
    write_script(root, "cc", FAKE_CC)
}

/// Mark an existing file as executable on Unix; no-op elsewhere.
pub fn make_executable(path: &Utf8Path) -> Result<()> {
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(path.as_std_path())
            .context("stat exec stub")?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path.as_std_path(), perms).context("chmod exec stub")?;
    }

    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}
