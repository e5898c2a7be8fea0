//! animenu - an animated on-screen menu driven by a remote control
//!
//! This library holds the menu engine (static menus, filesystem browsing,
//! navigation and visibility), the display surfaces it draws through, the
//! remote command sources and the dispatcher tying them together.

pub mod config;
pub mod dispatch;
pub mod launcher;
pub mod logging;
pub mod menu;
pub mod remote;
pub mod surface;
