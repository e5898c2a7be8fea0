//! # Remote Commands
//!
//! The overlay is driven by six navigation commands. They arrive already
//! decoded, one at a time, from a command source (see [`source`]).
//!
//! | Command | Effect |
//! |---------|--------|
//! | `show` | open the root menu, or close everything |
//! | `next` / `prev` | move the cursor of the deepest open menu |
//! | `select` | run the highlighted command |
//! | `forward` | open the highlighted submenu or browse item |
//! | `back` | close the deepest open menu |

pub mod source;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest command line accepted from a source.
pub const MAX_COMMAND_LEN: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteCommand {
    Show,
    Next,
    Prev,
    Select,
    Back,
    Forward,
}

impl RemoteCommand {
    pub const ALL: [RemoteCommand; 6] = [
        RemoteCommand::Show,
        RemoteCommand::Next,
        RemoteCommand::Prev,
        RemoteCommand::Select,
        RemoteCommand::Back,
        RemoteCommand::Forward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteCommand::Show => "show",
            RemoteCommand::Next => "next",
            RemoteCommand::Prev => "prev",
            RemoteCommand::Select => "select",
            RemoteCommand::Back => "back",
            RemoteCommand::Forward => "forward",
        }
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("command line too long ({0} characters)")]
    TooLong(usize),

    #[error("command not recognised: '{0}'")]
    Unrecognised(String),
}

impl FromStr for RemoteCommand {
    type Err = ParseCommandError;

    /// Parse the first word of `line`, ignoring case.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let length = line.chars().count();
        if length > MAX_COMMAND_LEN {
            return Err(ParseCommandError::TooLong(length));
        }

        let word = line.split_whitespace().next().unwrap_or_default();
        RemoteCommand::ALL
            .into_iter()
            .find(|command| command.as_str().eq_ignore_ascii_case(word))
            .ok_or_else(|| ParseCommandError::Unrecognised(word.to_owned()))
    }
}
