//! # Display Surfaces
//!
//! Every [`MenuTree`](crate::menu::MenuTree) draws through one display surface.
//! The menu engine never touches pixels or terminal cells itself; it only
//! drives the coarse primitives of [`DisplaySurface`]:
//!
//! | Primitive | Meaning |
//! |-----------|---------|
//! | `show` | run the reveal animation (frames `0..MAX_FRAME` step `REVEAL_STEP`) |
//! | `show_frame` | draw one reveal frame |
//! | `show_selected` | highlight a row (`None` clears the highlight) |
//! | `hide` | unmap immediately |
//! | `hide_frame` | draw one retraction frame |
//! | `dispose` | release the surface |
//!
//! Surfaces are created by a [`SurfaceFactory`] in a strict top-down pass:
//! a child panel is positioned from its parent's already-resolved
//! [`Geometry`], so a parent must always be created before its children.
//!
//! ## Implementations
//!
//! - [`terminal::TerminalSurface`] - draws animated panels with `crossterm`
//! - [`headless::HeadlessSurface`] - emits `tracing` events only

pub mod headless;
pub mod terminal;

use std::time::Duration;
use thiserror::Error;

/// Animations run from frame 0 up to (but excluding) this frame.
pub const MAX_FRAME: u32 = 2000;

/// Frame increment of the reveal animation.
pub const REVEAL_STEP: u32 = 30;

/// Frame increment of the retraction animation.
pub const RETRACT_STEP: u32 = 40;

/// A retraction frame beyond this one completes the hide.
pub const RETRACTED_FRAME: u32 = 1950;

/// Top-left cell of the root panel.
pub const ROOT_ORIGIN: (u16, u16) = (2, 1);

/// Columns added to the longest title to get a panel's width.
pub const PANEL_PADDING: u16 = 4;

/// Frame pacing for reveal and retraction animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Animation {
    /// Delay between two consecutive frames.
    pub frame_delay: Duration,
}

impl Animation {
    pub fn from_micros(micros: u64) -> Self {
        Self {
            frame_delay: Duration::from_micros(micros),
        }
    }

    /// No delay between frames. Used for tests and `--dump`.
    pub fn none() -> Self {
        Self::default()
    }

    /// Block the calling thread for one frame.
    pub fn pause(&self) {
        if !self.frame_delay.is_zero() {
            std::thread::sleep(self.frame_delay);
        }
    }

    pub fn reveal_frames() -> impl Iterator<Item = u32> {
        (0..MAX_FRAME).step_by(REVEAL_STEP as usize)
    }

    pub fn retract_frames() -> impl Iterator<Item = u32> {
        (0..MAX_FRAME).step_by(RETRACT_STEP as usize)
    }
}

/// Position and size of a panel, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
}

impl Geometry {
    /// Lay out a panel for `titles`.
    ///
    /// The root panel sits at [`ROOT_ORIGIN`]. A child panel starts at its
    /// parent's right edge, one row below the parent's top.
    pub fn layout<'a>(parent: Option<Geometry>, titles: impl IntoIterator<Item = &'a str>) -> Self {
        let (longest, rows) = titles.into_iter().fold((0usize, 0usize), |(longest, rows), title| {
            (longest.max(title.chars().count()), rows + 1)
        });

        let (left, top) = match parent {
            Some(parent) => (parent.right(), parent.top.saturating_add(1)),
            None => ROOT_ORIGIN,
        };

        Self {
            left,
            top,
            width: saturating_u16(longest).saturating_add(PANEL_PADDING),
            height: saturating_u16(rows),
        }
    }

    /// First column to the right of the panel.
    pub fn right(&self) -> u16 {
        self.left.saturating_add(self.width)
    }
}

fn saturating_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Errors raised while creating or drawing a surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("failed to draw menu panel: {0}")]
    Io(#[from] std::io::Error),

    #[error("display surface unavailable: {0}")]
    Unavailable(String),
}

/// One on-screen menu panel.
pub trait DisplaySurface: Send {
    fn geometry(&self) -> Geometry;

    /// Run the reveal animation, blocking for `animation.frame_delay` per frame.
    fn show(&mut self, animation: &Animation) {
        for frame in Animation::reveal_frames() {
            self.show_frame(frame);
            animation.pause();
        }
    }

    fn show_frame(&mut self, frame: u32);

    fn show_selected(&mut self, selected: Option<usize>);

    /// Unmap the panel without animating.
    fn hide(&mut self);

    fn hide_frame(&mut self, frame: u32);

    fn dispose(&mut self);
}

/// Creates surfaces for menu trees.
pub trait SurfaceFactory: Send {
    /// Create a surface for a menu whose rows are yielded by `titles`, placed
    /// relative to `parent` (`None` for the root menu).
    fn create(
        &mut self,
        parent: Option<Geometry>,
        titles: &mut dyn Iterator<Item = &str>,
    ) -> Result<Box<dyn DisplaySurface>, SurfaceError>;
}
