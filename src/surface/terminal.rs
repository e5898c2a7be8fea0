//! # Terminal Surface
//!
//! Draws menu panels directly into the terminal with `crossterm`.
//!
//! Reveal and retraction are staggered per row: row `n` of a panel with
//! `rows` rows starts moving `1000 / rows * n` frames after the first, and
//! each row takes [`SWEEP`] frames to fully appear or vanish. During a
//! reveal rows unroll from the top; during a retraction the bottom row goes
//! first.

use super::{DisplaySurface, Geometry, SurfaceError, SurfaceFactory, RETRACTED_FRAME};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Frames a single row needs to go from hidden to fully shown.
pub const SWEEP: u32 = 950;

/// Terminal output shared by every panel.
pub type SharedOutput = Arc<Mutex<dyn Write + Send>>;

/// Colours used for panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub foreground: Color,
    pub background: Color,
    pub selected: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            foreground: Color::Grey,
            background: Color::Black,
            selected: Color::White,
        }
    }
}

impl Palette {
    /// Build a palette from colour names, falling back to the default for
    /// any name that cannot be parsed.
    pub fn from_names(foreground: &str, background: &str, selected: &str) -> Self {
        let defaults = Self::default();
        Self {
            foreground: parse_colour(foreground).unwrap_or_else(|| {
                warn!("cannot resolve colour name '{}'", foreground);
                defaults.foreground
            }),
            background: parse_colour(background).unwrap_or_else(|| {
                warn!("cannot resolve colour name '{}'", background);
                defaults.background
            }),
            selected: parse_colour(selected).unwrap_or_else(|| {
                warn!("cannot resolve colour name '{}'", selected);
                defaults.selected
            }),
        }
    }
}

/// Parse a named colour (`green`, `dark_grey`, ...) or a `#rrggbb` triple.
pub fn parse_colour(name: &str) -> Option<Color> {
    let name = name.trim().to_ascii_lowercase();

    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
        };
        return Some(Color::Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        });
    }

    let colour = match name.replace([' ', '-'], "_").as_str() {
        "black" => Color::Black,
        "dark_grey" | "dark_gray" => Color::DarkGrey,
        "red" => Color::Red,
        "dark_red" => Color::DarkRed,
        "green" => Color::Green,
        "dark_green" => Color::DarkGreen,
        "yellow" => Color::Yellow,
        "dark_yellow" => Color::DarkYellow,
        "blue" => Color::Blue,
        "dark_blue" => Color::DarkBlue,
        "magenta" => Color::Magenta,
        "dark_magenta" => Color::DarkMagenta,
        "cyan" => Color::Cyan,
        "dark_cyan" => Color::DarkCyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        _ => return None,
    };
    Some(colour)
}

/// Creates [`TerminalSurface`]s that all write to the same output.
pub struct TerminalSurfaceFactory {
    palette: Palette,
    output: SharedOutput,
}

impl TerminalSurfaceFactory {
    pub fn new(palette: Palette, output: SharedOutput) -> Self {
        Self { palette, output }
    }

    pub fn stdout(palette: Palette) -> Self {
        Self::new(palette, Arc::new(Mutex::new(io::stdout())))
    }
}

impl SurfaceFactory for TerminalSurfaceFactory {
    fn create(
        &mut self,
        parent: Option<Geometry>,
        titles: &mut dyn Iterator<Item = &str>,
    ) -> Result<Box<dyn DisplaySurface>, SurfaceError> {
        let titles: Vec<String> = titles.map(str::to_owned).collect();
        let geometry = Geometry::layout(parent, titles.iter().map(String::as_str));

        Ok(Box::new(TerminalSurface {
            titles,
            geometry,
            palette: self.palette,
            output: Arc::clone(&self.output),
            selected: None,
            mapped: false,
        }))
    }
}

/// A menu panel drawn into the terminal.
pub struct TerminalSurface {
    titles: Vec<String>,
    geometry: Geometry,
    palette: Palette,
    output: SharedOutput,
    selected: Option<usize>,
    mapped: bool,
}

impl TerminalSurface {
    fn stagger(&self) -> u32 {
        let rows = u32::try_from(self.titles.len()).unwrap_or(u32::MAX).max(1);
        1000 / rows
    }

    fn row_offset(&self, row: usize) -> u32 {
        self.stagger()
            .saturating_mul(u32::try_from(row).unwrap_or(u32::MAX))
    }

    /// Draw every row, each clipped to `fraction(row)` of the panel width.
    fn draw(&self, fraction: impl Fn(usize) -> f32) -> io::Result<()> {
        let width = usize::from(self.geometry.width);
        let mut buffer = Vec::new();

        for (row, title) in self.titles.iter().enumerate() {
            let shown = visible_cells(width, fraction(row));
            let text: String = format!("  {:<pad$}", title, pad = width.saturating_sub(2))
                .chars()
                .take(shown)
                .collect();
            let colour = if self.selected == Some(row) {
                self.palette.selected
            } else {
                self.palette.foreground
            };

            queue!(
                buffer,
                MoveTo(self.geometry.left, self.row_line(row)),
                SetBackgroundColor(self.palette.background),
                SetForegroundColor(colour),
                Print(text),
                ResetColor,
                Print(" ".repeat(width - shown)),
            )?;
        }

        self.write(&buffer)
    }

    fn erase(&self) -> io::Result<()> {
        let blank = " ".repeat(usize::from(self.geometry.width));
        let mut buffer = Vec::new();
        for row in 0..self.titles.len() {
            queue!(
                buffer,
                MoveTo(self.geometry.left, self.row_line(row)),
                ResetColor,
                Print(&blank),
            )?;
        }
        self.write(&buffer)
    }

    fn row_line(&self, row: usize) -> u16 {
        self.geometry
            .top
            .saturating_add(u16::try_from(row).unwrap_or(u16::MAX))
    }

    fn write(&self, buffer: &[u8]) -> io::Result<()> {
        let mut output = self
            .output
            .lock()
            .map_err(|_| io::Error::other("terminal output lock poisoned"))?;
        output.write_all(buffer)?;
        output.flush()
    }

    fn report(result: io::Result<()>) {
        if let Err(err) = result {
            warn!("{}", SurfaceError::from(err));
        }
    }
}

fn progress(frame: u32, offset: u32) -> f32 {
    (frame.saturating_sub(offset) as f32 / SWEEP as f32).min(1.0)
}

fn visible_cells(width: usize, fraction: f32) -> usize {
    let cells = (width as f32 * fraction.clamp(0.0, 1.0)).ceil() as usize;
    cells.min(width)
}

impl DisplaySurface for TerminalSurface {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn show_frame(&mut self, frame: u32) {
        self.mapped = true;
        Self::report(self.draw(|row| progress(frame, self.row_offset(row))));
    }

    fn show_selected(&mut self, selected: Option<usize>) {
        self.selected = selected;
        if self.mapped {
            Self::report(self.draw(|_| 1.0));
        }
    }

    fn hide(&mut self) {
        if self.mapped {
            self.mapped = false;
            Self::report(self.erase());
        }
    }

    fn hide_frame(&mut self, frame: u32) {
        if frame > RETRACTED_FRAME {
            self.hide();
            return;
        }
        let last = self.titles.len().saturating_sub(1);
        Self::report(self.draw(|row| 1.0 - progress(frame, self.row_offset(last - row))));
    }

    fn dispose(&mut self) {
        self.hide();
        self.titles.clear();
    }
}
