//! Shared fixtures for integration tests: a display surface factory that
//! records every call and a launcher that remembers what it was asked to
//! run.

#![allow(dead_code)]

use animenu::launcher::Launcher;
use animenu::menu::{MenuItem, MenuTree};
use animenu::surface::{Animation, DisplaySurface, Geometry, SurfaceError, SurfaceFactory, RETRACTED_FRAME};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Created { id: usize, titles: Vec<String> },
    ShowFrame { id: usize, frame: u32 },
    Selected { id: usize, index: Option<usize> },
    Hide { id: usize },
    HideFrame { id: usize, frame: u32 },
    Disposed { id: usize },
}

/// Every surface call made through a [`RecordingFactory`], in order.
#[derive(Debug, Clone, Default)]
pub struct SurfaceLog(Arc<Mutex<Vec<SurfaceEvent>>>);

impl SurfaceLog {
    fn push(&self, event: SurfaceEvent) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    pub fn created(&self) -> usize {
        self.count(|event| matches!(event, SurfaceEvent::Created { .. }))
    }

    pub fn disposed(&self) -> usize {
        self.count(|event| matches!(event, SurfaceEvent::Disposed { .. }))
    }

    /// Id of the surface created for a menu whose first row is `title`.
    pub fn surface_for(&self, title: &str) -> Option<usize> {
        self.events().into_iter().rev().find_map(|event| match event {
            SurfaceEvent::Created { id, titles } if titles.first().map(String::as_str) == Some(title) => {
                Some(id)
            }
            _ => None,
        })
    }

    /// Highlight changes reported to surface `id`.
    pub fn selections(&self, id: usize) -> Vec<Option<usize>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SurfaceEvent::Selected { id: surface, index } if surface == id => Some(index),
                _ => None,
            })
            .collect()
    }

    /// Number of reveal animations started on surface `id`.
    pub fn reveals(&self, id: usize) -> usize {
        self.count(|event| *event == SurfaceEvent::ShowFrame { id, frame: 0 })
    }

    /// Number of retraction animations completed on surface `id`.
    pub fn retractions(&self, id: usize) -> usize {
        self.count(|event| {
            matches!(event, SurfaceEvent::HideFrame { id: surface, frame } if *surface == id && *frame > RETRACTED_FRAME)
        })
    }

    fn count(&self, predicate: impl Fn(&SurfaceEvent) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|event| predicate(event)).count()
    }
}

/// Hands out [`RecordingSurface`]s. Creating a surface for a menu holding a
/// row titled `fail_on` fails.
#[derive(Debug, Clone, Default)]
pub struct RecordingFactory {
    pub log: SurfaceLog,
    next_id: Arc<Mutex<usize>>,
    fail_on: Option<String>,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(title: &str) -> Self {
        Self {
            fail_on: Some(title.to_owned()),
            ..Self::default()
        }
    }
}

impl SurfaceFactory for RecordingFactory {
    fn create(
        &mut self,
        parent: Option<Geometry>,
        titles: &mut dyn Iterator<Item = &str>,
    ) -> Result<Box<dyn DisplaySurface>, SurfaceError> {
        let titles: Vec<String> = titles.map(str::to_owned).collect();
        if let Some(poison) = &self.fail_on {
            if titles.contains(poison) {
                return Err(SurfaceError::Unavailable(format!("refusing '{}'", poison)));
            }
        }

        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            *next_id
        };
        let geometry = Geometry::layout(parent, titles.iter().map(String::as_str));
        self.log.push(SurfaceEvent::Created { id, titles });
        Ok(Box::new(RecordingSurface {
            id,
            geometry,
            log: self.log.clone(),
        }))
    }
}

pub struct RecordingSurface {
    id: usize,
    geometry: Geometry,
    log: SurfaceLog,
}

impl DisplaySurface for RecordingSurface {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn show_frame(&mut self, frame: u32) {
        self.log.push(SurfaceEvent::ShowFrame { id: self.id, frame });
    }

    fn show_selected(&mut self, selected: Option<usize>) {
        self.log.push(SurfaceEvent::Selected {
            id: self.id,
            index: selected,
        });
    }

    fn hide(&mut self) {
        self.log.push(SurfaceEvent::Hide { id: self.id });
    }

    fn hide_frame(&mut self, frame: u32) {
        self.log.push(SurfaceEvent::HideFrame { id: self.id, frame });
    }

    fn dispose(&mut self) {
        self.log.push(SurfaceEvent::Disposed { id: self.id });
    }
}

/// Remembers launched commands instead of running them.
#[derive(Debug, Clone, Default)]
pub struct RecordingLauncher(Arc<Mutex<Vec<String>>>);

impl RecordingLauncher {
    pub fn launched(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, command: &str) {
        self.0.lock().unwrap().push(command.to_owned());
    }
}

/// A menu of command items running `run <title>`.
pub fn command_menu(titles: &[&str]) -> MenuTree {
    let mut menu = MenuTree::new(Animation::none());
    for title in titles {
        menu.push(MenuItem::command(*title, format!("run {}", title)));
    }
    menu
}

/// Root menu `Radio`, `Settings` (a submenu with `Audio`, `Video`) and
/// `Shutdown`.
pub fn nested_menu() -> MenuTree {
    let mut root = command_menu(&["Radio"]);
    root.push(MenuItem::submenu("Settings", command_menu(&["Audio", "Video"])));
    root.push(MenuItem::command("Shutdown", "poweroff"));
    root
}

pub fn touch(dir: &std::path::Path, name: &str) {
    std::fs::write(dir.join(name), b"").unwrap();
}
