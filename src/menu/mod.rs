//! # Menu Engine
//!
//! The data model and navigation rules of the overlay.
//!
//! ## Module Structure
//!
//! - [`item`] - a single row: command, submenu, browse or placeholder
//! - [`tree`] - a menu panel with its cursor, visibility and open chain
//! - [`browse`] - generates menus from directory listings
//! - [`definition`] - loads static menus from definition files
//! - [`pattern`] - browse pattern helpers
//!
//! ## Ownership
//!
//! A [`MenuTree`] owns its items, and an item owns the tree nested under
//! it. Dropping a tree drops everything below it and releases each display
//! surface exactly once, children before parents.

pub mod browse;
pub mod definition;
pub mod item;
pub mod pattern;
pub mod tree;

pub use browse::BrowseError;
pub use definition::{MenuError, MenuLoader, MenuRecord};
pub use item::{BrowseSpec, ItemKind, ItemType, MenuItem, EMPTY_TITLE, PLAY_ALL_TITLE};
pub use tree::{MenuPath, MenuTree};
