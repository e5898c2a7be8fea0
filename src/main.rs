//! # animenu Entry Point
//!
//! Loads the menu definitions, draws the overlay and feeds it commands from
//! a remote control.
//!
//! ## Usage
//!
//! ```bash
//! # Listen to lircd and draw the overlay in this terminal
//! animenu
//!
//! # Type commands (show, next, prev, select, forward, back) on stdin
//! animenu --source stdin
//!
//! # Print the static menu structure and exit
//! animenu --dump
//!
//! # No drawing, follow navigation in the log instead
//! animenu --headless --source stdin -DD
//! ```
//!
//! ## Flow
//!
//! 1. **Configuration**: `config.json` merged with command line overrides
//! 2. **Menus**: `root.menu` and every definition it names, with surfaces
//!    bound top-down
//! 3. **Source**: a tokio task decoding remote input into commands
//! 4. **Dispatch**: commands applied to the menus until the source ends

use animenu::config::Config;
use animenu::dispatch::Dispatcher;
use animenu::launcher::ShellLauncher;
use animenu::logging::{self, LogConfig};
use animenu::menu::definition;
use animenu::menu::MenuTree;
use animenu::remote::source;
use animenu::surface::headless::HeadlessSurfaceFactory;
use animenu::surface::terminal::TerminalSurfaceFactory;
use animenu::surface::{Animation, SurfaceFactory};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::info;

/// Where remote commands come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CommandSource {
    /// The lircd broadcast socket
    Lircd,
    /// One command per line on stdin
    Stdin,
}

/// animenu - an animated on-screen menu for remote controls
#[derive(Parser, Debug)]
#[command(name = "animenu")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "An animated on-screen menu driven by a remote control", long_about = None)]
struct Args {
    /// Configuration file (default: ~/.config/animenu/config.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding root.menu
    #[arg(long, value_name = "DIR")]
    menu_dir: Option<PathBuf>,

    /// Seconds before open menus disappear (0 for no timeout)
    #[arg(short = 't', long, value_name = "SECS")]
    menu_timeout: Option<u64>,

    /// Delay between animation frames, in microseconds
    #[arg(short = 'a', long, value_name = "MICROS")]
    menu_animation: Option<u64>,

    /// Print the menu structure and exit
    #[arg(short = 'M', long)]
    dump: bool,

    /// More diagnostics (repeat for more)
    #[arg(short = 'D', long, action = ArgAction::Count)]
    debug: u8,

    /// Where commands are read from
    #[arg(long, value_enum, default_value_t = CommandSource::Lircd)]
    source: CommandSource,

    /// lircd socket to connect to
    #[arg(long, value_name = "PATH")]
    socket: Option<PathBuf>,

    /// Log navigation instead of drawing the overlay
    #[arg(long)]
    headless: bool,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Load the configuration and apply command line overrides.
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        if let Some(dir) = &self.menu_dir {
            config.menu_dir = Some(dir.clone());
        }
        if let Some(timeout) = self.menu_timeout {
            config.menu_timeout_secs = timeout;
        }
        if let Some(animation) = self.menu_animation {
            config.menu_animation_us = animation;
        }
        if let Some(socket) = &self.socket {
            config.lircd_socket = socket.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(&LogConfig::from_verbosity(args.debug).with_log_file(args.log_file.clone()))
        .context("Failed to open log file")?;

    // Restore the terminal before the panic message is printed
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let result = run_application(args).await;

    let _ = panic::take_hook();

    result
}

async fn run_application(args: Args) -> Result<()> {
    let config = args.resolve_config()?;
    let menu_dir = config.menu_dir()?;

    if args.dump {
        let root = definition::load_root(&menu_dir, Animation::none())
            .with_context(|| format!("Failed to load menus from {}", menu_dir.display()))?;
        print!("{}", root.dump());
        return Ok(());
    }

    if args.headless {
        let mut surfaces = HeadlessSurfaceFactory::default();
        let root = load_menus(&menu_dir, &config, &mut surfaces)?;
        return drive(root, Box::new(surfaces), &args, &config).await;
    }

    let mut surfaces = TerminalSurfaceFactory::stdout(config.palette());
    let root = load_menus(&menu_dir, &config, &mut surfaces)?;

    setup_terminal().context("Failed to setup terminal")?;
    let run_result = drive(root, Box::new(surfaces), &args, &config).await;
    let cleanup_result = restore_terminal().context("Failed to restore terminal");

    run_result?;
    cleanup_result?;

    Ok(())
}

fn load_menus(menu_dir: &Path, config: &Config, surfaces: &mut dyn SurfaceFactory) -> Result<MenuTree> {
    let root = definition::load_bound(menu_dir, config.animation(), surfaces)
        .with_context(|| format!("Failed to load menus from {}", menu_dir.display()))?;
    info!("loaded {} top level menu items", root.len());
    Ok(root)
}

/// Feed commands from the configured source to the menus until the source
/// runs dry.
async fn drive(
    root: MenuTree,
    surfaces: Box<dyn SurfaceFactory>,
    args: &Args,
    config: &Config,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let source = match args.source {
        CommandSource::Stdin => source::spawn_stdin(tx),
        CommandSource::Lircd => spawn_lircd(config, tx)?,
    };

    let mut dispatcher = Dispatcher::new(
        root,
        surfaces,
        Box::new(ShellLauncher::default()),
        config.menu_timeout(),
    );
    dispatcher.run(&mut rx).await;
    drop(dispatcher);

    let forwarded = source.await.context("Command source task failed")??;
    info!("command source finished after {} commands", forwarded);
    Ok(())
}

#[cfg(unix)]
fn spawn_lircd(
    config: &Config,
    tx: mpsc::UnboundedSender<animenu::remote::RemoteCommand>,
) -> Result<tokio::task::JoinHandle<Result<usize>>> {
    Ok(source::spawn_lircd(
        config.lircd_socket.clone(),
        config.keymap(),
        tx,
    ))
}

#[cfg(not(unix))]
fn spawn_lircd(
    _config: &Config,
    _tx: mpsc::UnboundedSender<animenu::remote::RemoteCommand>,
) -> Result<tokio::task::JoinHandle<Result<usize>>> {
    anyhow::bail!("lircd is only available on unix, use --source stdin")
}

fn setup_terminal() -> io::Result<()> {
    execute!(io::stdout(), EnterAlternateScreen, Clear(ClearType::All), cursor::Hide)
}

fn restore_terminal() -> io::Result<()> {
    execute!(io::stdout(), cursor::Show, LeaveAlternateScreen)
}
