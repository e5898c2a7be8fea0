//! # Configuration
//!
//! User settings stored in `~/.config/animenu/config.json`.
//!
//! Every field has a default, so an empty object (or a missing file) is a
//! valid configuration. On first run the defaults are written to the default
//! location so they can be edited. Command line options override what is
//! loaded here.
//!
//! ```json
//! {
//!   "menu_timeout_secs": 5,
//!   "menu_animation_us": 1000,
//!   "menu_dir": "/home/user/.animenu",
//!   "colours": { "foreground": "green", "background": "black", "selected": "white" },
//!   "lircd_socket": "/var/run/lirc/lircd",
//!   "keymap": { "KEY_MENU": "show", "KEY_OK": "select" },
//!   "accept_repeats": false
//! }
//! ```
//!
//! The `directories` crate resolves the platform config directory, which
//! also holds the menu definitions unless `menu_dir` says otherwise.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::remote::source::LircKeymap;
use crate::remote::RemoteCommand;
use crate::surface::terminal::Palette;
use crate::surface::Animation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Seconds without a command before open menus are retracted. 0 never.
    #[serde(default = "default_menu_timeout_secs")]
    pub menu_timeout_secs: u64,

    /// Delay between animation frames, in microseconds.
    #[serde(default = "default_menu_animation_us")]
    pub menu_animation_us: u64,

    /// Directory holding `root.menu` and the definitions it refers to.
    #[serde(default)]
    pub menu_dir: Option<PathBuf>,

    #[serde(default)]
    pub colours: Colours,

    #[serde(default = "default_lircd_socket")]
    pub lircd_socket: PathBuf,

    /// Remote button name to command.
    #[serde(default = "default_keymap")]
    pub keymap: BTreeMap<String, RemoteCommand>,

    /// Treat held-down buttons as repeated presses.
    #[serde(default)]
    pub accept_repeats: bool,
}

/// Colour names for the terminal overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Colours {
    #[serde(default = "default_foreground")]
    pub foreground: String,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_selected")]
    pub selected: String,
}

fn default_menu_timeout_secs() -> u64 {
    5
}

fn default_menu_animation_us() -> u64 {
    1000
}

fn default_lircd_socket() -> PathBuf {
    PathBuf::from("/var/run/lirc/lircd")
}

fn default_keymap() -> BTreeMap<String, RemoteCommand> {
    [
        ("KEY_MENU", RemoteCommand::Show),
        ("KEY_DOWN", RemoteCommand::Next),
        ("KEY_UP", RemoteCommand::Prev),
        ("KEY_OK", RemoteCommand::Select),
        ("KEY_LEFT", RemoteCommand::Back),
        ("KEY_BACK", RemoteCommand::Back),
        ("KEY_RIGHT", RemoteCommand::Forward),
    ]
    .into_iter()
    .map(|(button, command)| (button.to_owned(), command))
    .collect()
}

fn default_foreground() -> String {
    "grey".to_owned()
}

fn default_background() -> String {
    "black".to_owned()
}

fn default_selected() -> String {
    "white".to_owned()
}

impl Default for Colours {
    fn default() -> Self {
        Self {
            foreground: default_foreground(),
            background: default_background(),
            selected: default_selected(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            menu_timeout_secs: default_menu_timeout_secs(),
            menu_animation_us: default_menu_animation_us(),
            menu_dir: None,
            colours: Colours::default(),
            lircd_socket: default_lircd_socket(),
            keymap: default_keymap(),
            accept_repeats: false,
        }
    }
}

impl Config {
    /// Load the configuration from its default location, writing the
    /// defaults there if there is no file yet. A file that cannot be parsed
    /// is an error.
    pub fn load() -> Result<Self> {
        Self::load_or_init(&Self::config_path()?)
    }

    /// Like [`Config::load_from`], but a missing file is created with the
    /// defaults. Failing to write it only costs a warning.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }
        let config = Self::default();
        match config.save_to(path) {
            Ok(()) => info!("wrote default config to '{}'", path.display()),
            Err(e) => warn!("{:#}", e),
        }
        Ok(config)
    }

    /// Load configuration from a specific path. Returns `Config::default()`
    /// if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save the configuration to a specific path, creating parent
    /// directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path of the config file.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    fn config_dir() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "animenu")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().to_path_buf())
    }

    /// Directory to load menu definitions from.
    pub fn menu_dir(&self) -> Result<PathBuf> {
        match &self.menu_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::config_dir(),
        }
    }

    pub fn animation(&self) -> Animation {
        Animation::from_micros(self.menu_animation_us)
    }

    /// Inactivity timeout, `None` when disabled.
    pub fn menu_timeout(&self) -> Option<Duration> {
        (self.menu_timeout_secs > 0).then(|| Duration::from_secs(self.menu_timeout_secs))
    }

    pub fn palette(&self) -> Palette {
        Palette::from_names(
            &self.colours.foreground,
            &self.colours.background,
            &self.colours.selected,
        )
    }

    pub fn keymap(&self) -> LircKeymap {
        LircKeymap::new(self.keymap.clone(), self.accept_repeats)
    }
}
