//! A display surface that only logs.
//!
//! Useful when no terminal is attached (running as a service) and for
//! following navigation with `-DD`.

use super::{DisplaySurface, Geometry, SurfaceError, SurfaceFactory, RETRACTED_FRAME};
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct HeadlessSurfaceFactory {
    created: usize,
}

impl HeadlessSurfaceFactory {
    /// Number of surfaces handed out so far.
    pub fn created(&self) -> usize {
        self.created
    }
}

impl SurfaceFactory for HeadlessSurfaceFactory {
    fn create(
        &mut self,
        parent: Option<Geometry>,
        titles: &mut dyn Iterator<Item = &str>,
    ) -> Result<Box<dyn DisplaySurface>, SurfaceError> {
        let titles: Vec<String> = titles.map(str::to_owned).collect();
        let geometry = Geometry::layout(parent, titles.iter().map(String::as_str));
        let id = self.created;
        self.created += 1;
        trace!(surface = id, ?geometry, rows = titles.len(), "created surface");
        Ok(Box::new(HeadlessSurface { id, titles, geometry }))
    }
}

#[derive(Debug)]
pub struct HeadlessSurface {
    id: usize,
    titles: Vec<String>,
    geometry: Geometry,
}

impl DisplaySurface for HeadlessSurface {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn show_frame(&mut self, frame: u32) {
        trace!(surface = self.id, frame, "reveal frame");
    }

    fn show_selected(&mut self, selected: Option<usize>) {
        let title = selected
            .and_then(|index| self.titles.get(index))
            .map_or("<none>", String::as_str);
        debug!(surface = self.id, ?selected, "selected '{}'", title);
    }

    fn hide(&mut self) {
        debug!(surface = self.id, "hidden");
    }

    fn hide_frame(&mut self, frame: u32) {
        trace!(surface = self.id, frame, "retract frame");
        if frame > RETRACTED_FRAME {
            debug!(surface = self.id, "retracted");
        }
    }

    fn dispose(&mut self) {
        trace!(surface = self.id, "disposed");
    }
}
