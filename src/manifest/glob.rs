//! Expansion of executable source patterns.

use glob::{MatchOptions, glob_with};

use super::ManifestError;

const GLOB_CHARS: [char; 3] = ['*', '?', '['];

fn is_pattern(entry: &str) -> bool {
    entry.contains(GLOB_CHARS)
}

/// Expand `entries` into source file names.
///
/// Entries without glob metacharacters are kept as written, whether or not
/// they exist yet. Patterns are expanded relative to the working directory;
/// matches are sorted, use `/` separators, and skip directories.
///
/// # Errors
///
/// Returns [`ManifestError::Pattern`] for an invalid pattern,
/// [`ManifestError::EmptyGlob`] when a pattern matches no files, and
/// [`ManifestError::GlobMatch`] when a match cannot be read or is not UTF-8.
pub fn expand_sources(entries: &[String]) -> Result<Vec<String>, ManifestError> {
    let mut sources = Vec::new();
    for entry in entries {
        if is_pattern(entry) {
            sources.extend(expand_pattern(entry)?);
        } else {
            sources.push(entry.clone());
        }
    }
    Ok(sources)
}

fn expand_pattern(pattern: &str) -> Result<Vec<String>, ManifestError> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let paths = glob_with(pattern, options).map_err(|source| ManifestError::Pattern {
        pattern: pattern.to_owned(),
        source,
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| ManifestError::GlobMatch {
            pattern: pattern.to_owned(),
            reason: err.to_string(),
        })?;
        if path.is_dir() {
            continue;
        }
        let text = path.to_str().ok_or_else(|| ManifestError::GlobMatch {
            pattern: pattern.to_owned(),
            reason: format!("{} is not valid UTF-8", path.display()),
        })?;
        matches.push(text.replace('\\', "/"));
    }
    if matches.is_empty() {
        return Err(ManifestError::EmptyGlob {
            pattern: pattern.to_owned(),
        });
    }
    matches.sort();
    Ok(matches)
}
