//! # Filesystem Browse
//!
//! Builds the content of a browse item by scanning one directory.
//!
//! Regular files whose full path matches the pattern become command items,
//! preceded by a single "play all" item that passes every match at once.
//! Directories (and links to them) are either listed as further browse
//! items to be scanned when opened, or, for recursive browses, scanned
//! right away with empty branches pruned.
//!
//! Entries are visited in file name order, so a given directory snapshot
//! always produces the same menu. A recursive browse skips a link only when
//! it leads back to a directory it is already inside.
//!
//! Matched paths are passed to the shell in double quotes with `\`, `"`,
//! `$` and backticks escaped.

use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::item::{BrowseSpec, MenuItem, PLAY_ALL_TITLE};
use super::pattern;
use super::tree::MenuTree;
use crate::surface::{Animation, SurfaceError};

#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("browse item has no pattern")]
    MissingPattern,

    #[error("cannot derive a directory to scan from pattern '{pattern}'")]
    NoBasePath { pattern: String },

    #[error("browse path '{}' is not absolute", .path.display())]
    RelativeBase { path: PathBuf },

    #[error("cannot open directory '{}'", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid browse pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("cannot create display surface for '{title}'")]
    Surface {
        title: String,
        #[source]
        source: SurfaceError,
    },
}

/// Generate the menu for `spec`.
///
/// The returned tree has no surfaces bound yet; binding is up to the
/// caller, below the geometry of the menu holding the browse item.
pub fn generate(spec: &BrowseSpec, animation: Animation) -> Result<MenuTree, BrowseError> {
    if spec.pattern.is_empty() {
        return Err(BrowseError::MissingPattern);
    }
    let regex = pattern::compile(&spec.pattern).map_err(|source| BrowseError::Pattern {
        pattern: spec.pattern.clone(),
        source,
    })?;
    let base = resolve_base(spec)?;

    let mut scanner = Scanner {
        regex,
        animation,
        ancestors: Vec::new(),
    };
    scanner.scan(spec, &base)
}

/// Directory to scan for `spec`: its explicit path, or the one derived from
/// the pattern.
pub fn resolve_base(spec: &BrowseSpec) -> Result<PathBuf, BrowseError> {
    let base = match &spec.path {
        Some(path) => path.clone(),
        None => pattern::base_dir(&spec.pattern).ok_or_else(|| BrowseError::NoBasePath {
            pattern: spec.pattern.clone(),
        })?,
    };
    if !base.is_absolute() {
        return Err(BrowseError::RelativeBase { path: base });
    }
    Ok(base)
}

enum Entry {
    File(PathBuf),
    Directory(PathBuf),
}

struct Scanner {
    regex: Regex,
    animation: Animation,
    /// Canonical paths of the directories on the current descent, outermost
    /// first.
    ancestors: Vec<PathBuf>,
}

impl Scanner {
    fn scan(&mut self, spec: &BrowseSpec, dir: &Path) -> Result<MenuTree, BrowseError> {
        let entries = self.list(dir)?;
        let canonical = fs::canonicalize(dir).ok();
        if let Some(canonical) = &canonical {
            self.ancestors.push(canonical.clone());
        }
        let menu = self.build(spec, dir, &entries);
        if canonical.is_some() {
            self.ancestors.pop();
        }
        Ok(menu)
    }

    fn build(&mut self, spec: &BrowseSpec, dir: &Path, entries: &[Entry]) -> MenuTree {
        let matched: Vec<&PathBuf> = entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::File(path) => Some(path),
                Entry::Directory(_) => None,
            })
            .collect();

        let mut menu = MenuTree::new(self.animation);
        if !matched.is_empty() {
            let all = matched.iter().fold(spec.command.clone(), |command, path| {
                format!("{} {}", command, quote(path))
            });
            menu.push(MenuItem::command(PLAY_ALL_TITLE, all));
        }

        for entry in entries {
            match entry {
                Entry::File(path) => {
                    let command = format!("{} {}", spec.command, quote(path));
                    menu.push(MenuItem::command(file_title(path), command));
                }
                Entry::Directory(path) if spec.recurse => {
                    if let Some(item) = self.scan_nested(spec, path) {
                        menu.push(item);
                    }
                }
                Entry::Directory(path) => {
                    menu.push(MenuItem::browse(file_title(path), spec.rooted_at(path)));
                }
            }
        }

        if menu.is_empty() {
            debug!("nothing to browse in '{}'", dir.display());
            menu.push(MenuItem::empty());
        }
        menu
    }

    /// Scan a subdirectory of a recursive browse, dropping it when there is
    /// nothing below it.
    fn scan_nested(&mut self, spec: &BrowseSpec, dir: &Path) -> Option<MenuItem> {
        if let Ok(canonical) = fs::canonicalize(dir) {
            if self.ancestors.contains(&canonical) {
                debug!("'{}' leads back to a parent directory, skipping", dir.display());
                return None;
            }
        }

        let nested = spec.rooted_at(dir);
        match self.scan(&nested, dir) {
            Ok(menu) if menu.is_placeholder() => None,
            Ok(menu) => Some(MenuItem::browse_with(file_title(dir), nested, menu)),
            Err(err) => {
                warn!("{}", err);
                None
            }
        }
    }

    /// Files matching the pattern and every subdirectory of `dir`, in name
    /// order.
    fn list(&self, dir: &Path) -> Result<Vec<Entry>, BrowseError> {
        // walkdir reports an unreadable root as just another entry error
        fs::read_dir(dir).map(drop).map_err(|source| BrowseError::Unreadable {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut entries = Vec::new();
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping entry in '{}': {}", dir.display(), err);
                    continue;
                }
            };
            let file_type = if entry.path_is_symlink() {
                match fs::metadata(entry.path()) {
                    Ok(metadata) => metadata.file_type(),
                    Err(err) => {
                        warn!("skipping dangling link '{}': {}", entry.path().display(), err);
                        continue;
                    }
                }
            } else {
                entry.file_type()
            };
            let path = entry.into_path();

            if file_type.is_dir() {
                entries.push(Entry::Directory(path));
            } else if file_type.is_file() && self.regex.is_match(&path.to_string_lossy()) {
                entries.push(Entry::File(path));
            }
        }
        Ok(entries)
    }
}

/// `path` in double quotes, with the characters the shell still expands
/// inside them escaped.
fn quote(path: &Path) -> String {
    let text = path.to_string_lossy();
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn file_title(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}
