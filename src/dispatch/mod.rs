//! # Command Dispatcher
//!
//! Turns remote commands into menu operations.
//!
//! Besides the per-menu cursors kept by each [`MenuTree`], the dispatcher
//! tracks which menu of the open chain is the navigation target (the
//! "current menu") and an [`InactivityTimer`] that retracts everything when
//! no command arrives for a while.
//!
//! Every operation on the tree runs to completion, animations included,
//! before the next command is taken from the channel.

mod timer;

pub use timer::InactivityTimer;

use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::launcher::Launcher;
use crate::menu::{MenuItem, MenuPath, MenuTree};
use crate::remote::RemoteCommand;
use crate::surface::SurfaceFactory;

pub struct Dispatcher {
    root: MenuTree,
    current: Option<MenuPath>,
    surfaces: Box<dyn SurfaceFactory>,
    launcher: Box<dyn Launcher>,
    timer: InactivityTimer,
}

impl Dispatcher {
    /// `surfaces` is used for menus generated while browsing; `root` must
    /// already have its surfaces bound.
    pub fn new(
        root: MenuTree,
        surfaces: Box<dyn SurfaceFactory>,
        launcher: Box<dyn Launcher>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            root,
            current: None,
            surfaces,
            launcher,
            timer: InactivityTimer::new(timeout),
        }
    }

    pub fn root(&self) -> &MenuTree {
        &self.root
    }

    /// Path of the menu commands currently act on, `None` when closed.
    pub fn current_menu(&self) -> Option<&MenuPath> {
        self.current.as_ref()
    }

    pub fn current_tree(&self) -> Option<&MenuTree> {
        self.root.descend(self.current.as_ref()?)
    }

    /// When the open menus will be retracted if nothing else arrives.
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn handle(&mut self, command: RemoteCommand) {
        self.handle_at(command, Instant::now());
    }

    /// Apply `command` as if it arrived at `now`.
    pub fn handle_at(&mut self, command: RemoteCommand, now: Instant) {
        self.timer.disarm();
        debug!("command: {}", command);

        match command {
            RemoteCommand::Show => self.toggle(),
            RemoteCommand::Next => self.step(MenuTree::next),
            RemoteCommand::Prev => self.step(MenuTree::prev),
            RemoteCommand::Select => self.select(),
            RemoteCommand::Forward => self.forward(),
            RemoteCommand::Back => self.back(),
        }

        if command != RemoteCommand::Show || self.root.is_visible() {
            self.timer.arm(now);
        }
    }

    /// Retract everything if the inactivity deadline has passed.
    pub fn expire(&mut self, now: Instant) -> bool {
        if !self.timer.is_due(now) {
            return false;
        }
        self.timer.disarm();
        info!("menu timed out");
        self.root.hide();
        self.current = None;
        true
    }

    /// Handle commands from `rx` until the channel closes.
    ///
    /// Must run on a multi-threaded runtime: commands are applied with
    /// [`tokio::task::block_in_place`] since animations block.
    pub async fn run(&mut self, rx: &mut UnboundedReceiver<RemoteCommand>) {
        loop {
            let now = Instant::now();
            if self.expire(now) {
                continue;
            }

            let received = match self.timer.remaining(now) {
                Some(remaining) => match tokio::time::timeout(remaining, rx.recv()).await {
                    Ok(received) => received,
                    Err(_) => continue,
                },
                None => rx.recv().await,
            };
            let Some(command) = received else {
                debug!("command channel closed");
                break;
            };

            tokio::task::block_in_place(|| self.handle(command));
        }
        self.shutdown();
    }

    /// Retract anything still on screen and forget the current menu.
    pub fn shutdown(&mut self) {
        self.timer.disarm();
        self.root.hide();
        self.current = None;
    }

    fn toggle(&mut self) {
        if self.root.is_visible() {
            self.root.hide();
            self.current = None;
            return;
        }
        self.root.show();
        self.root.next();
        self.current = Some(MenuPath::root());
        self.log_current();
    }

    fn step(&mut self, step: fn(&mut MenuTree) -> Option<usize>) {
        match self.current.as_ref() {
            Some(path) => {
                if let Some(menu) = self.root.descend_mut(path) {
                    step(menu);
                }
            }
            None => {
                // a closed overlay reopens at the root
                step(&mut self.root);
                self.current = Some(self.root.open_chain());
            }
        }
    }

    fn select(&mut self) {
        let Some(path) = self.current.clone() else {
            return;
        };
        if self.root.activate(&path, self.launcher.as_ref()) {
            self.current = None;
        } else {
            debug!("nothing to run at {}", path);
        }
    }

    fn forward(&mut self) {
        let Some(path) = self.current.clone() else {
            return;
        };
        let Some(menu) = self.root.descend_mut(&path) else {
            return;
        };
        let Some(index) = menu.current_index() else {
            return;
        };

        match menu.select_current(self.surfaces.as_mut()) {
            Ok(true) => {
                let child = path.child(index);
                if let Some(opened) = self.root.descend_mut(&child) {
                    if opened.current_item().is_some_and(MenuItem::is_play_all) {
                        opened.next();
                    }
                }
                self.current = Some(child);
                self.log_current();
            }
            Ok(false) => debug!("nothing to open at {}", path),
            Err(err) => warn!("cannot open browse menu: {}", err),
        }
    }

    fn back(&mut self) {
        let Some(path) = self.current.clone() else {
            return;
        };
        let Some(parent) = path.parent() else {
            return;
        };

        if let Some(menu) = self.root.descend_mut(&path) {
            menu.hide();
        }
        if let Some(menu) = self.root.descend_mut(&parent) {
            menu.show_current();
        }
        self.current = Some(parent);
    }

    fn log_current(&self) {
        let title = self
            .current_tree()
            .and_then(MenuTree::current_item)
            .map_or("<none>", MenuItem::title);
        debug!("current item: {}", title);
    }
}
