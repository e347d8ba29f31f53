#![forbid(unsafe_code)]

//! Shared environment constants used across vrog crates (library, tests, and
//! helpers).

/// Environment variable naming the C compiler driver.
///
/// Used as the default program for both compiling and linking when a
/// manifest does not name one.
///
/// # Examples
///
/// ```
/// use vrog_env::COMPILER_ENV;
/// assert_eq!(COMPILER_ENV, "CC");
/// ```
pub const COMPILER_ENV: &str = "CC";

/// Compiler driver used when [`COMPILER_ENV`] is unset.
pub const DEFAULT_COMPILER: &str = "cc";
