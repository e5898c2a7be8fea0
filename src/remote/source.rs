//! Command sources.
//!
//! Each source runs as a tokio task and pushes decoded commands into an
//! unbounded channel read by the dispatcher. Input that does not decode is
//! logged and skipped; a source only ends when its input ends or the
//! dispatcher goes away.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::RemoteCommand;

/// Maps lircd button names to commands.
#[derive(Debug, Clone)]
pub struct LircKeymap {
    buttons: BTreeMap<String, RemoteCommand>,
    accept_repeats: bool,
}

impl LircKeymap {
    pub fn new(buttons: BTreeMap<String, RemoteCommand>, accept_repeats: bool) -> Self {
        Self {
            buttons,
            accept_repeats,
        }
    }

    /// Decode one lircd broadcast line: `<code> <repeat> <button> <remote>`.
    ///
    /// Returns `None` for repeats (unless accepted), unmapped buttons and
    /// lines that are not button presses.
    pub fn decode(&self, line: &str) -> Option<RemoteCommand> {
        let mut fields = line.split_whitespace();
        let (Some(_code), Some(repeat), Some(button)) = (fields.next(), fields.next(), fields.next())
        else {
            trace!("ignoring lircd line '{}'", line);
            return None;
        };

        let Ok(repeat) = u32::from_str_radix(repeat, 16) else {
            warn!("malformed repeat count in lircd line '{}'", line);
            return None;
        };
        if repeat != 0 && !self.accept_repeats {
            trace!("dropping repeat {} of {}", repeat, button);
            return None;
        }

        let command = self.buttons.get(button).copied();
        if command.is_none() {
            debug!("button {} is not mapped", button);
        }
        command
    }
}

/// Parse a line typed on stdin, skipping blank lines.
pub fn parse_line(line: &str) -> Option<RemoteCommand> {
    if line.trim().is_empty() {
        return None;
    }
    match line.parse() {
        Ok(command) => Some(command),
        Err(err) => {
            warn!("{}", err);
            None
        }
    }
}

/// Read `reader` line by line, sending every decoded command to `tx`.
///
/// Returns the number of commands forwarded once the input ends or the
/// receiving side is closed.
pub async fn forward_lines<R, F>(reader: R, tx: UnboundedSender<RemoteCommand>, decode: F) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    F: Fn(&str) -> Option<RemoteCommand>,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read command input")? {
        let Some(command) = decode(&line) else {
            continue;
        };
        trace!("received {}", command);
        if tx.send(command).is_err() {
            debug!("dispatcher gone, stopping command source");
            break;
        }
        forwarded += 1;
    }
    Ok(forwarded)
}

/// Read commands typed on stdin, one per line.
pub fn spawn_stdin(tx: UnboundedSender<RemoteCommand>) -> JoinHandle<Result<usize>> {
    tokio::spawn(forward_lines(BufReader::new(tokio::io::stdin()), tx, parse_line))
}

/// Listen to the lircd broadcast socket at `socket`.
#[cfg(unix)]
pub fn spawn_lircd(
    socket: std::path::PathBuf,
    keymap: LircKeymap,
    tx: UnboundedSender<RemoteCommand>,
) -> JoinHandle<Result<usize>> {
    tokio::spawn(async move {
        let stream = tokio::net::UnixStream::connect(&socket)
            .await
            .with_context(|| format!("Failed to connect to lircd at {}", socket.display()))?;
        debug!("connected to lircd at {}", socket.display());
        forward_lines(BufReader::new(stream), tx, |line| keymap.decode(line)).await
    })
}
