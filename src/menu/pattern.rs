//! Helpers for the full-path patterns used by browse items.
//!
//! A browse pattern is an extended regular expression matched
//! case-insensitively against the *full* path of each file, e.g.
//! `/srv/music/.*\.(mp3|ogg)$`. When no explicit base directory is given
//! the directory to scan is derived from the pattern's literal prefix.

use regex::{Regex, RegexBuilder};
use std::path::PathBuf;

/// Characters that end the literal prefix of a pattern unless escaped.
const METACHARACTERS: &[char] = &['*', '.', '[', ']', '(', ')', '|', '^', '$', '?', '+'];

/// Compile a pattern for case-insensitive matching.
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// The part of `pattern` before its first unescaped metacharacter.
pub fn literal_prefix(pattern: &str) -> &str {
    let mut escaped = false;
    for (index, c) in pattern.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if METACHARACTERS.contains(&c) {
            return &pattern[..index];
        }
    }
    pattern
}

/// Derive the deepest directory that must exist for `pattern` to match
/// anything: the literal prefix truncated at its last `/`.
///
/// Returns `None` when the prefix contains no separator at all.
pub fn base_dir(pattern: &str) -> Option<PathBuf> {
    let prefix = literal_prefix(pattern);
    let cut = prefix.rfind('/')?;
    let dir = unescape(&prefix[..cut]);
    if dir.is_empty() {
        Some(PathBuf::from("/"))
    } else {
        Some(PathBuf::from(dir))
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
