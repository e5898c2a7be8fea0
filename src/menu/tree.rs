//! # Menu Tree
//!
//! A [`MenuTree`] owns its items by value and every submenu or browse item
//! owns its nested tree, so the whole hierarchy is a plain ownership tree.
//! Nothing points back up: a menu inside the hierarchy is addressed from
//! the root by a [`MenuPath`], the item indices leading to it.
//!
//! ## Open chain
//!
//! A visible tree whose current item leads to a visible nested tree is
//! "open" into that tree. Following current items from the root while the
//! nested tree is visible yields the open chain; navigation always acts on
//! its deepest member and retraction walks it top to bottom every frame.

use std::fmt;
use tracing::{debug, warn};

use super::browse::BrowseError;
use super::item::{ItemKind, ItemType, MenuItem};
use crate::launcher::Launcher;
use crate::surface::{Animation, DisplaySurface, Geometry, SurfaceError, SurfaceFactory, RETRACTED_FRAME};

/// Item indices leading from the root menu to a nested menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MenuPath(Vec<usize>);

impl MenuPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The menu nested under item `index` of this one.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// The menu containing this one, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for MenuPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for MenuPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "{}", parts.join("/"))
    }
}

/// An ordered list of items shown as one panel, plus its cursor and
/// visibility.
pub struct MenuTree {
    items: Vec<MenuItem>,
    current: Option<usize>,
    visible: bool,
    surface: Option<Box<dyn DisplaySurface>>,
    animation: Animation,
}

impl fmt::Debug for MenuTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuTree")
            .field("items", &self.items)
            .field("current", &self.current)
            .field("visible", &self.visible)
            .field("surface", &self.surface.as_ref().map(|surface| surface.geometry()))
            .finish()
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Next,
    Prev,
}

impl MenuTree {
    pub fn new(animation: Animation) -> Self {
        Self {
            items: Vec::new(),
            current: None,
            visible: false,
            surface: None,
            animation,
        }
    }

    /// Append an item. Order of insertion is display order.
    pub fn push(&mut self, item: MenuItem) {
        self.items.push(item);
    }

    /// Remove and return the item at `index`, dropping its nested menu with
    /// it once the caller lets go.
    pub fn remove(&mut self, index: usize) -> Option<MenuItem> {
        if index >= self.items.len() {
            return None;
        }
        self.current = match self.current {
            Some(current) if current == index => None,
            Some(current) if current > index => Some(current - 1),
            other => other,
        };
        Some(self.items.remove(index))
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&MenuItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_item(&self) -> Option<&MenuItem> {
        self.items.get(self.current?)
    }

    pub fn current_item_mut(&mut self) -> Option<&mut MenuItem> {
        self.items.get_mut(self.current?)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn animation(&self) -> Animation {
        self.animation
    }

    /// Geometry of the bound surface, if any.
    pub fn geometry(&self) -> Option<Geometry> {
        self.surface.as_ref().map(|surface| surface.geometry())
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Whether this menu holds nothing but the "empty" placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self.items.as_slice(), [only] if only.item_type() == ItemType::Empty)
    }

    /// Point the cursor at the first item, or nowhere for an empty menu.
    pub fn reset_current(&mut self) {
        self.current = if self.items.is_empty() { None } else { Some(0) };
    }

    /// Create surfaces for this menu and, below it, for every nested menu
    /// that already exists.
    ///
    /// Surfaces are created parent first since a child panel is laid out
    /// from its parent's geometry. A nested menu whose surface cannot be
    /// created is dropped from the tree; failing to create this menu's own
    /// surface is returned to the caller.
    pub fn bind_surfaces(
        &mut self,
        factory: &mut dyn SurfaceFactory,
        parent: Option<Geometry>,
    ) -> Result<(), SurfaceError> {
        if let Some(mut previous) = self.surface.take() {
            previous.dispose();
        }

        let mut titles = self.items.iter().map(MenuItem::title);
        let surface = factory.create(parent, &mut titles)?;
        let geometry = surface.geometry();
        self.surface = Some(surface);

        let mut index = 0;
        while index < self.items.len() {
            let failed = match self.items[index].nested_mut() {
                Some(child) => child.bind_surfaces(factory, Some(geometry)).err(),
                None => None,
            };
            match failed {
                Some(err) => {
                    warn!(
                        "dropping '{}': {}",
                        self.items[index].title(),
                        err
                    );
                    self.remove(index);
                }
                None => index += 1,
            }
        }
        Ok(())
    }

    /// Reveal this menu, or act on the open chain when it is already shown.
    ///
    /// A hidden menu becomes visible and plays its reveal animation. A
    /// visible menu passes the request to its open child; the deepest open
    /// menu, having no open child, hides instead.
    pub fn show(&mut self) {
        if !self.visible {
            self.visible = true;
            if let Some(surface) = self.surface.as_mut() {
                surface.show(&self.animation);
            }
            return;
        }

        let child = self
            .open_child_index()
            .and_then(|index| self.items[index].nested_mut());
        match child {
            Some(child) => child.show(),
            None => self.hide(),
        }
    }

    /// Retract this menu and every open menu below it, frame by frame in
    /// lockstep. Clears the cursor once done.
    pub fn hide(&mut self) {
        if !self.visible {
            return;
        }
        for frame in Animation::retract_frames() {
            self.hide_frame(frame);
            self.animation.pause();
        }
    }

    fn hide_frame(&mut self, frame: u32) {
        if let Some(child) = self
            .open_child_index()
            .and_then(|index| self.items[index].nested_mut())
        {
            child.hide_frame(frame);
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.hide_frame(frame);
        }
        if frame > RETRACTED_FRAME {
            self.visible = false;
            self.current = None;
        }
    }

    /// Move the cursor of the deepest open menu one item down.
    ///
    /// Reveals this menu first when hidden. Moving past the last item leaves
    /// nothing selected; the next call starts over at the first item.
    /// Returns the new index in the menu that moved.
    pub fn next(&mut self) -> Option<usize> {
        self.step(Direction::Next)
    }

    /// Move the cursor of the deepest open menu one item up.
    pub fn prev(&mut self) -> Option<usize> {
        self.step(Direction::Prev)
    }

    fn step(&mut self, direction: Direction) -> Option<usize> {
        if !self.visible {
            self.show();
        }
        let chain = self.open_chain();
        let menu = self.descend_mut(&chain)?;
        menu.current = menu.neighbour(direction);
        menu.show_current()
    }

    fn neighbour(&self, direction: Direction) -> Option<usize> {
        let last = self.items.len().checked_sub(1)?;
        match (direction, self.current) {
            (Direction::Next, None) => Some(0),
            (Direction::Next, Some(current)) if current < last => Some(current + 1),
            (Direction::Prev, None) => Some(last),
            (Direction::Prev, Some(current)) if current > 0 => Some(current - 1),
            _ => None,
        }
    }

    /// Report the cursor to the surface without animating, and return it.
    pub fn show_current(&mut self) -> Option<usize> {
        let current = self.current.filter(|&index| index < self.items.len());
        if let Some(surface) = self.surface.as_mut() {
            surface.show_selected(current);
        }
        current
    }

    /// Index of the current item when it leads to a visible menu.
    pub fn open_child_index(&self) -> Option<usize> {
        self.current
            .filter(|&index| self.items.get(index).is_some_and(MenuItem::has_open_submenu))
    }

    /// Path from this menu to the deepest menu of its open chain.
    pub fn open_chain(&self) -> MenuPath {
        let mut indices = Vec::new();
        let mut menu = self;
        while let Some(index) = menu.open_child_index() {
            match menu.items[index].nested() {
                Some(child) => {
                    indices.push(index);
                    menu = child;
                }
                None => break,
            }
        }
        MenuPath(indices)
    }

    pub fn descend(&self, path: &MenuPath) -> Option<&MenuTree> {
        let mut menu = self;
        for &index in path.indices() {
            menu = menu.items.get(index)?.nested()?;
        }
        Some(menu)
    }

    pub fn descend_mut(&mut self, path: &MenuPath) -> Option<&mut MenuTree> {
        let mut menu = self;
        for &index in path.indices() {
            menu = menu.items.get_mut(index)?.nested_mut()?;
        }
        Some(menu)
    }

    /// Open the menu behind the current item.
    ///
    /// Returns `Ok(false)` when there is no current item or it has nothing
    /// to open.
    pub fn select_current(&mut self, surfaces: &mut dyn SurfaceFactory) -> Result<bool, BrowseError> {
        let parent = self.geometry();
        let animation = self.animation;
        match self.current.and_then(|index| self.items.get_mut(index)) {
            Some(item) => item.select(parent, surfaces, animation),
            None => Ok(false),
        }
    }

    /// Run the current command item of the menu at `menu`.
    ///
    /// `self` must be the root: the whole hierarchy is retracted before the
    /// command is handed to `launcher`. Returns `false`, changing nothing,
    /// when the current item is not a command.
    pub fn activate(&mut self, menu: &MenuPath, launcher: &dyn Launcher) -> bool {
        let Some(command) = self
            .descend(menu)
            .and_then(MenuTree::current_item)
            .and_then(MenuItem::command_line)
            .map(str::to_owned)
        else {
            return false;
        };

        self.hide();
        debug!("activating '{}'", command);
        launcher.launch(&command);
        true
    }

    /// Render the static structure, one item per line, nested items
    /// indented by `..` per level.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let indent = "..".repeat(depth);
        for item in &self.items {
            match item.kind() {
                ItemKind::Command { command } => {
                    out.push_str(&format!("{}[{}], [{}]\n", indent, item.title(), command));
                }
                ItemKind::Submenu { menu } => {
                    out.push_str(&format!("{}[{}], menu:\n", indent, item.title()));
                    menu.dump_into(out, depth + 1);
                }
                ItemKind::Browse { spec, .. } => {
                    out.push_str(&format!(
                        "{}[{}], browse [{}], [{}]\n",
                        indent,
                        item.title(),
                        spec.pattern,
                        spec.command
                    ));
                }
                ItemKind::Empty => {
                    out.push_str(&format!("{}[{}]\n", indent, item.title()));
                }
            }
        }
    }
}

impl Drop for MenuTree {
    fn drop(&mut self) {
        // children release their surfaces before the parent does
        self.items.clear();
        if let Some(mut surface) = self.surface.take() {
            if self.visible {
                surface.hide();
            }
            surface.dispose();
        }
    }
}
