//! # Menu Definitions
//!
//! Static menus are described in plain text files, one record per item:
//!
//! ```text
//! # comments and blank lines are ignored
//! item
//!     Radio
//!     mpc play
//! menu
//!     Music
//!     music.menu
//! browse /srv/video/.*\.(mkv|mp4)$
//!     Videos
//!     mpv --fs
//! ```
//!
//! A record is three significant lines: a type line, a title and a payload.
//! Indentation is cosmetic, except that further indented lines after the
//! payload continue it, and a non-indented line starting with a keyword
//! always begins a new record. The type line holds a keyword:
//!
//! | Keyword | Payload | Item |
//! |---------|---------|------|
//! | `item` | shell command | command |
//! | `menu` | definition file, relative to the menu directory | submenu |
//! | `browse <pattern>` | command prefix | browse |
//! | `browse_recurse <pattern>` | command prefix | recursive browse |
//!
//! Bad records and nested definitions that fail to load are skipped with a
//! warning; the rest of the menu is still built.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use super::item::{BrowseSpec, MenuItem};
use super::tree::MenuTree;
use crate::surface::{Animation, SurfaceError, SurfaceFactory};

/// Definition file of the top level menu, inside the menu directory.
pub const ROOT_MENU_FILE: &str = "root.menu";

const KEYWORDS: &[&str] = &["item", "menu", "browse", "browse_recurse"];

fn starts_with_keyword(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|word| KEYWORDS.iter().any(|keyword| word.eq_ignore_ascii_case(keyword)))
}

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("cannot read menu definition '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("record at line {line} has no {field}")]
    Incomplete { line: usize, field: &'static str },

    #[error("unknown item type '{keyword}' for '{title}' at line {line}")]
    UnknownType {
        line: usize,
        title: String,
        keyword: String,
    },

    #[error("menu definition '{}' includes itself", .path.display())]
    Cycle { path: PathBuf },

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// One parsed record of a definition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRecord {
    /// Line number of the type line, starting at 1.
    pub line: usize,
    /// Lower-cased first word of the type line.
    pub keyword: String,
    /// Rest of the type line (the pattern of a browse record).
    pub argument: String,
    pub title: String,
    pub payload: String,
}

struct PendingRecord {
    line: usize,
    lines: Vec<String>,
}

impl PendingRecord {
    fn finish(self) -> Result<MenuRecord, MenuError> {
        let line = self.line;
        let mut lines = self.lines.into_iter();
        let type_line = lines.next().unwrap_or_default();
        let title = lines
            .next()
            .ok_or(MenuError::Incomplete { line, field: "title" })?;
        let payload: Vec<String> = lines.collect();
        if payload.is_empty() {
            return Err(MenuError::Incomplete {
                line,
                field: "command",
            });
        }

        let (keyword, argument) = match type_line.split_once(char::is_whitespace) {
            Some((keyword, argument)) => (keyword, argument.trim()),
            None => (type_line.as_str(), ""),
        };

        Ok(MenuRecord {
            line,
            keyword: keyword.to_lowercase(),
            argument: argument.to_owned(),
            title,
            payload: payload.join(" "),
        })
    }
}

/// Split definition text into records.
///
/// Each entry is either a complete record or the reason the record starting
/// at that line is unusable.
pub fn parse_records(text: &str) -> Vec<Result<MenuRecord, MenuError>> {
    let mut records = Vec::new();
    let mut pending: Option<PendingRecord> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let indented = raw.starts_with(char::is_whitespace);

        match pending.as_mut() {
            Some(record)
                if indented || (record.lines.len() < 3 && !starts_with_keyword(line)) =>
            {
                record.lines.push(line.to_owned());
            }
            _ => {
                if let Some(done) = pending.take() {
                    records.push(done.finish());
                }
                pending = Some(PendingRecord {
                    line: index + 1,
                    lines: vec![line.to_owned()],
                });
            }
        }
    }

    if let Some(done) = pending {
        records.push(done.finish());
    }
    records
}

/// Builds menu trees from definition files.
#[derive(Debug)]
pub struct MenuLoader {
    menu_dir: PathBuf,
    animation: Animation,
    /// Definitions currently being loaded, outermost first.
    loading: Vec<PathBuf>,
}

impl MenuLoader {
    pub fn new(menu_dir: impl Into<PathBuf>, animation: Animation) -> Self {
        Self {
            menu_dir: menu_dir.into(),
            animation,
            loading: Vec::new(),
        }
    }

    /// Load [`ROOT_MENU_FILE`] from the menu directory.
    pub fn load_root(&mut self) -> Result<MenuTree, MenuError> {
        let path = self.menu_dir.join(ROOT_MENU_FILE);
        self.load_menu(&path)
    }

    /// Load one definition file, together with every submenu it names.
    pub fn load_menu(&mut self, path: &Path) -> Result<MenuTree, MenuError> {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if self.loading.contains(&key) {
            return Err(MenuError::Cycle {
                path: path.to_path_buf(),
            });
        }

        let text = fs::read_to_string(path).map_err(|source| MenuError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loading menu definition '{}'", path.display());

        self.loading.push(key);
        let menu = self.build(parse_records(&text));
        self.loading.pop();
        Ok(menu)
    }

    /// Build a menu from parsed records, skipping the ones that fail.
    pub fn build(&mut self, records: Vec<Result<MenuRecord, MenuError>>) -> MenuTree {
        let mut menu = MenuTree::new(self.animation);
        for record in records {
            match record.and_then(|record| self.item_for(&record)) {
                Ok(item) => menu.push(item),
                Err(err) => warn!("skipping menu item: {}", err),
            }
        }
        menu
    }

    fn item_for(&mut self, record: &MenuRecord) -> Result<MenuItem, MenuError> {
        match record.keyword.as_str() {
            "item" => Ok(MenuItem::command(&record.title, &record.payload)),
            "menu" => {
                let path = self.menu_dir.join(&record.payload);
                let nested = self.load_menu(&path)?;
                Ok(MenuItem::submenu(&record.title, nested))
            }
            keyword @ ("browse" | "browse_recurse") => {
                if record.argument.is_empty() {
                    return Err(MenuError::Incomplete {
                        line: record.line,
                        field: "pattern",
                    });
                }
                let spec = BrowseSpec::new(
                    &record.argument,
                    &record.payload,
                    keyword == "browse_recurse",
                );
                Ok(MenuItem::browse(&record.title, spec))
            }
            _ => Err(MenuError::UnknownType {
                line: record.line,
                title: record.title.clone(),
                keyword: record.keyword.clone(),
            }),
        }
    }
}

/// Load the root menu found in `menu_dir`.
pub fn load_root(menu_dir: &Path, animation: Animation) -> Result<MenuTree, MenuError> {
    MenuLoader::new(menu_dir, animation).load_root()
}

/// Load the root menu and bind display surfaces for the whole static tree.
pub fn load_bound(
    menu_dir: &Path,
    animation: Animation,
    surfaces: &mut dyn SurfaceFactory,
) -> Result<MenuTree, MenuError> {
    let mut root = load_root(menu_dir, animation)?;
    root.bind_surfaces(surfaces, None)?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::item::ItemType;
    use tempfile::TempDir;

    fn record(records: &[Result<MenuRecord, MenuError>], index: usize) -> &MenuRecord {
        records[index].as_ref().unwrap()
    }

    #[test]
    fn test_parse_indented_records() {
        let text = "\
# main menu
item
    Radio
    mpc play

browse_recurse /srv/music/.*\\.mp3$
    Music
    mpg123
";
        let records = parse_records(text);
        assert_eq!(records.len(), 2);

        let radio = record(&records, 0);
        assert_eq!(radio.line, 2);
        assert_eq!(radio.keyword, "item");
        assert_eq!(radio.title, "Radio");
        assert_eq!(radio.payload, "mpc play");

        let music = record(&records, 1);
        assert_eq!(music.line, 6);
        assert_eq!(music.keyword, "browse_recurse");
        assert_eq!(music.argument, "/srv/music/.*\\.mp3$");
    }

    #[test]
    fn test_parse_flat_triples() {
        let records = parse_records("ITEM\nOne\ntrue\nitem\nTwo\nfalse\n");
        assert_eq!(records.len(), 2);
        assert_eq!(record(&records, 0).keyword, "item");
        assert_eq!(record(&records, 1).title, "Two");
    }

    #[test]
    fn test_parse_continuation_lines_join_payload() {
        let records = parse_records("item\n  Long\n  mpv --fs\n    --loop\n");
        assert_eq!(record(&records, 0).payload, "mpv --fs --loop");
    }

    #[test]
    fn test_parse_incomplete_trailing_record() {
        let records = parse_records("item\n  One\n  true\nitem\n  Dangling\n");
        assert_eq!(records.len(), 2);
        assert!(matches!(
            records[1],
            Err(MenuError::Incomplete {
                line: 4,
                field: "command"
            })
        ));
    }

    #[test]
    fn test_keyword_line_ends_short_record() {
        let records = parse_records("item\n  Radio\nitem\n  TV\n  tv\n");
        assert_eq!(records.len(), 2);
        assert!(matches!(
            records[0],
            Err(MenuError::Incomplete {
                line: 1,
                field: "command"
            })
        ));
        let tv = record(&records, 1);
        assert_eq!(tv.title, "TV");
        assert_eq!(tv.payload, "tv");
        assert_eq!(tv.line, 3);
    }

    #[test]
    fn test_flat_record_cut_short_by_keyword() {
        let records = parse_records("item\nRadio\nMENU\nSettings\nsettings.menu\n");
        assert_eq!(records.len(), 2);
        assert!(records[0].is_err());
        assert_eq!(record(&records, 1).payload, "settings.menu");
    }

    #[test]
    fn test_load_builds_items_and_skips_bad_records() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(ROOT_MENU_FILE),
            "item\n  Radio\n  mpc play\nwidget\n  Bogus\n  nothing\nmenu\n  Missing\n  absent.menu\nbrowse /srv/.*\n  Files\n  xdg-open\n",
        )
        .unwrap();

        let root = load_root(temp_dir.path(), Animation::none()).unwrap();

        let kinds: Vec<ItemType> = root.items().iter().map(MenuItem::item_type).collect();
        assert_eq!(kinds, vec![ItemType::Command, ItemType::Browse]);
        assert_eq!(
            root.item(1)
                .and_then(MenuItem::browse_spec)
                .map(|spec| spec.recurse),
            Some(false)
        );
    }

    #[test]
    fn test_load_nested_definitions() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(ROOT_MENU_FILE),
            "menu\n  Power\n  power.menu\n",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("power.menu"),
            "item\n  Shutdown\n  poweroff\n",
        )
        .unwrap();

        let root = load_root(temp_dir.path(), Animation::none()).unwrap();

        assert_eq!(
            root.dump(),
            "[Power], menu:\n..[Shutdown], [poweroff]\n"
        );
    }

    #[test]
    fn test_self_including_definition_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(ROOT_MENU_FILE),
            "item\n  Radio\n  mpc play\nmenu\n  Again\n  loop.menu\n",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("loop.menu"),
            "item\n  Inner\n  true\nmenu\n  Forever\n  loop.menu\n",
        )
        .unwrap();

        let root = load_root(temp_dir.path(), Animation::none()).unwrap();

        assert_eq!(
            root.dump(),
            "[Radio], [mpc play]\n[Again], menu:\n..[Inner], [true]\n"
        );
    }

    #[test]
    fn test_missing_root_is_a_construction_failure() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            load_root(temp_dir.path(), Animation::none()),
            Err(MenuError::Read { .. })
        ));
    }

    #[test]
    fn test_empty_definition_is_a_valid_menu() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(ROOT_MENU_FILE), "# nothing yet\n").unwrap();

        let root = load_root(temp_dir.path(), Animation::none()).unwrap();
        assert!(root.is_empty());
    }
}
