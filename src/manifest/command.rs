//! `$in`/`$out` substitution for handwritten target commands.

use shell_quote::{QuoteRefExt, Sh};

use super::ManifestError;

const SNIPPET_LEN: usize = 160;

/// Returns `true` when the command contains an odd number of backticks.
fn has_unmatched_backticks(s: &str) -> bool {
    s.chars().filter(|&c| c == '`').count().rem_euclid(2) != 0
}

fn quote(word: &str) -> String {
    let bytes: Vec<u8> = word.quoted(Sh);
    String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

fn quote_all(words: &[String]) -> String {
    words
        .iter()
        .map(|word| quote(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Expand `$in` and `$out` in `template` for `target`.
///
/// `$in` becomes the shell-quoted `inputs` joined by spaces and `$out` the
/// shell-quoted target. Placeholders must stand alone as words, so `$input`
/// is left untouched, as is anything between backticks.
///
/// # Errors
///
/// Returns [`ManifestError::InvalidCommand`] when the result has unbalanced
/// quotes or backticks.
///
/// # Examples
///
/// ```
/// use vrog::manifest::interpolate_command;
///
/// let inputs = vec!["a b.txt".to_owned()];
/// let command = interpolate_command("docs", "cp $in $out", &inputs)?;
/// assert_eq!(
///     shlex::split(&command),
///     Some(vec!["cp".to_owned(), "a b.txt".to_owned(), "docs".to_owned()])
/// );
/// # Ok::<(), vrog::manifest::ManifestError>(())
/// ```
pub fn interpolate_command(
    target: &str,
    template: &str,
    inputs: &[String],
) -> Result<String, ManifestError> {
    let ins = quote_all(inputs);
    let out = quote(target);
    let interpolated = substitute(template, &ins, &out);
    if has_unmatched_backticks(&interpolated) || shlex::split(&interpolated).is_none() {
        return Err(ManifestError::InvalidCommand {
            target: target.to_owned(),
            snippet: interpolated.chars().take(SNIPPET_LEN).collect(),
        });
    }
    Ok(interpolated)
}

const fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Length of the placeholder `$<name>` at `pos`, when it stands alone.
fn placeholder_at(chars: &[char], pos: usize, name: &str) -> Option<usize> {
    let len = name.chars().count();
    let matches = name
        .chars()
        .enumerate()
        .all(|(offset, ch)| chars.get(pos + 1 + offset) == Some(&ch));
    let before = pos
        .checked_sub(1)
        .and_then(|prev| chars.get(prev))
        .is_none_or(|c| !is_identifier_char(*c));
    let after = chars
        .get(pos + 1 + len)
        .is_none_or(|c| !is_identifier_char(*c));
    (matches && before && after).then_some(len + 1)
}

fn substitute(template: &str, ins: &str, out: &str) -> String {
    let chars: Vec<char> = template.chars().collect();
    let mut result = String::with_capacity(template.len());
    let mut in_backticks = false;
    let mut i = 0;
    while let Some(&ch) = chars.get(i) {
        if ch == '`' {
            in_backticks = !in_backticks;
        } else if ch == '$' && !in_backticks {
            let replacement = placeholder_at(&chars, i, "in")
                .map(|skip| (ins, skip))
                .or_else(|| placeholder_at(&chars, i, "out").map(|skip| (out, skip)));
            if let Some((text, skip)) = replacement {
                result.push_str(text);
                i += skip;
                continue;
            }
        }
        result.push(ch);
        i += 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn inputs() -> Vec<String> {
        vec!["in".to_owned(), "aux file".to_owned()]
    }

    #[rstest]
    #[case("echo $input $out_dir", "echo $input $out_dir")]
    #[case("echo `cat $in` && echo $out", "echo `cat $in` && echo out")]
    #[case("touch $out", "touch out")]
    fn replaces_standalone_placeholders(#[case] template: &str, #[case] expected: &str) {
        let command = interpolate_command("out", template, &inputs()).expect("command");
        assert_eq!(command, expected);
    }

    #[test]
    fn quotes_inputs_as_separate_words() {
        let command = interpolate_command("out", "cp $in $out", &inputs()).expect("command");
        assert_eq!(
            shlex::split(&command).expect("shell words"),
            ["cp", "in", "aux file", "out"]
        );
    }

    #[rstest]
    #[case("echo `")]
    #[case("echo 'unterminated")]
    fn rejects_unbalanced_quoting(#[case] template: &str) {
        let err = interpolate_command("out", template, &inputs()).expect_err("invalid");
        match err {
            ManifestError::InvalidCommand { target, snippet } => {
                assert_eq!(target, "out");
                assert_eq!(snippet, template);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
