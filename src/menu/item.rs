use std::path::PathBuf;
use tracing::debug;

use super::browse::{self, BrowseError};
use super::tree::MenuTree;
use crate::surface::{Animation, Geometry, SurfaceFactory};

/// Title of the synthetic first item of a browse menu that plays every
/// matched file.
pub const PLAY_ALL_TITLE: &str = "| play all |";

/// Title of the placeholder shown for a browse menu with nothing in it.
pub const EMPTY_TITLE: &str = "| empty |";

/// What kind of row an item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Command,
    Submenu,
    Browse,
    Empty,
}

/// Where and how a browse item scans the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseSpec {
    /// Directory to scan. When `None` it is derived from `pattern`.
    pub path: Option<PathBuf>,
    /// Full-path pattern selecting files, matched case-insensitively.
    pub pattern: String,
    /// Command prefix; matched paths are appended as quoted arguments.
    pub command: String,
    /// Descend into subdirectories at generation time instead of listing
    /// them as plain browse entries.
    pub recurse: bool,
}

impl BrowseSpec {
    pub fn new(pattern: impl Into<String>, command: impl Into<String>, recurse: bool) -> Self {
        Self {
            path: None,
            pattern: pattern.into(),
            command: command.into(),
            recurse,
        }
    }

    /// The same browse rooted at `path`.
    pub fn rooted_at(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..self.clone()
        }
    }
}

#[derive(Debug)]
pub enum ItemKind {
    Command {
        command: String,
    },
    Submenu {
        menu: Box<MenuTree>,
    },
    Browse {
        spec: BrowseSpec,
        /// The most recently generated content, if any.
        menu: Option<Box<MenuTree>>,
    },
    Empty,
}

/// One row of a menu.
#[derive(Debug)]
pub struct MenuItem {
    title: String,
    kind: ItemKind,
}

impl MenuItem {
    pub fn command(title: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: ItemKind::Command {
                command: command.into(),
            },
        }
    }

    pub fn submenu(title: impl Into<String>, menu: MenuTree) -> Self {
        Self {
            title: title.into(),
            kind: ItemKind::Submenu {
                menu: Box::new(menu),
            },
        }
    }

    /// A browse item. Its content is generated when the item is selected.
    pub fn browse(title: impl Into<String>, spec: BrowseSpec) -> Self {
        Self {
            title: title.into(),
            kind: ItemKind::Browse { spec, menu: None },
        }
    }

    /// A browse item whose content has already been generated.
    pub fn browse_with(title: impl Into<String>, spec: BrowseSpec, menu: MenuTree) -> Self {
        Self {
            title: title.into(),
            kind: ItemKind::Browse {
                spec,
                menu: Some(Box::new(menu)),
            },
        }
    }

    pub fn empty() -> Self {
        Self {
            title: EMPTY_TITLE.to_owned(),
            kind: ItemKind::Empty,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn item_type(&self) -> ItemType {
        match self.kind {
            ItemKind::Command { .. } => ItemType::Command,
            ItemKind::Submenu { .. } => ItemType::Submenu,
            ItemKind::Browse { .. } => ItemType::Browse,
            ItemKind::Empty => ItemType::Empty,
        }
    }

    /// The command line of a command item.
    pub fn command_line(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Command { command } => Some(command),
            _ => None,
        }
    }

    pub fn browse_spec(&self) -> Option<&BrowseSpec> {
        match &self.kind {
            ItemKind::Browse { spec, .. } => Some(spec),
            _ => None,
        }
    }

    /// The nested menu of a submenu item, or the generated content of a
    /// browse item.
    pub fn nested(&self) -> Option<&MenuTree> {
        match &self.kind {
            ItemKind::Submenu { menu } => Some(&**menu),
            ItemKind::Browse { menu, .. } => menu.as_deref(),
            _ => None,
        }
    }

    pub fn nested_mut(&mut self) -> Option<&mut MenuTree> {
        match &mut self.kind {
            ItemKind::Submenu { menu } => Some(&mut **menu),
            ItemKind::Browse { menu, .. } => menu.as_deref_mut(),
            _ => None,
        }
    }

    /// Whether this item leads to a menu that is currently on screen.
    pub fn has_open_submenu(&self) -> bool {
        self.nested().is_some_and(MenuTree::is_visible)
    }

    pub fn is_play_all(&self) -> bool {
        matches!(self.kind, ItemKind::Command { .. }) && self.title == PLAY_ALL_TITLE
    }

    /// Open the menu behind this item.
    ///
    /// A submenu is opened as is. A browse item first (re)generates its
    /// content, binds surfaces for it below `parent` and replaces whatever
    /// it generated before. Returns `Ok(false)` for items that have no menu
    /// to open. On error the item is left untouched.
    pub fn select(
        &mut self,
        parent: Option<Geometry>,
        surfaces: &mut dyn SurfaceFactory,
        animation: Animation,
    ) -> Result<bool, BrowseError> {
        match &mut self.kind {
            ItemKind::Submenu { menu } => {
                open(menu);
                Ok(true)
            }
            ItemKind::Browse { spec, menu } => {
                let mut generated = browse::generate(spec, animation)?;
                generated
                    .bind_surfaces(surfaces, parent)
                    .map_err(|source| BrowseError::Surface {
                        title: self.title.clone(),
                        source,
                    })?;

                if let Some(previous) = menu.take() {
                    debug!("discarding previous content of '{}'", self.title);
                    drop(previous);
                }
                open(menu.insert(Box::new(generated)));
                Ok(true)
            }
            ItemKind::Command { .. } | ItemKind::Empty => Ok(false),
        }
    }
}

/// Highlight the first row and reveal `menu`.
fn open(menu: &mut MenuTree) {
    menu.reset_current();
    menu.show();
    menu.show_current();
}
