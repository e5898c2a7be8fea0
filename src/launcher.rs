//! # Command Launcher
//!
//! Activating a command item hands its command line to a [`Launcher`]. The
//! launch is fire-and-forget: the menu never waits for the command, never
//! joins it and never sees its exit status.
//!
//! [`ShellLauncher`] runs the command through `sh -c` on a detached thread
//! with stdin, stdout and stderr disconnected, so that a player writing to
//! the terminal cannot scribble over the overlay.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Runs the command attached to an activated menu item.
pub trait Launcher: Send + Sync {
    fn launch(&self, command: &str);
}

#[derive(Debug, Clone)]
pub struct ShellLauncher {
    shell: PathBuf,
}

impl Default for ShellLauncher {
    fn default() -> Self {
        Self::new("sh")
    }
}

impl ShellLauncher {
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Launcher for ShellLauncher {
    fn launch(&self, command: &str) {
        if command.trim().is_empty() {
            warn!("refusing to launch an empty command");
            return;
        }

        let shell = self.shell.clone();
        let command = command.to_owned();
        info!("launching: {}", command);

        let spawned = std::thread::Builder::new()
            .name("animenu-launch".to_owned())
            .spawn(move || {
                let status = Command::new(&shell)
                    .arg("-c")
                    .arg(&command)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status();
                match status {
                    Ok(status) => debug!("'{}' exited with {}", command, status),
                    Err(err) => warn!("failed to execute '{}': {}", command, err),
                }
            });

        if let Err(err) = spawned {
            warn!("failed to spawn launcher thread: {}", err);
        }
    }
}
