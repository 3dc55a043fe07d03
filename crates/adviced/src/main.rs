//! Command line front end for the advice caption renderer.
//!
//! Resolves caption parameters from a query string, prints them, renders them to
//! an image file or saves them to the configured settings store.
//!
//! # Usage
//!
//! ```bash
//! # Write the default configuration
//! advice init
//!
//! # Show what a request resolves to, with its share link
//! advice resolve --query "top=Listen&bottom=random()"
//!
//! # Render to a PNG for a phone-sized viewport
//! advice render --set top=Listen --viewport 375x667 --output advice.png
//!
//! # Store the resolved settings remotely
//! advice save --query "bg=random()"
//! ```
//!
//! Log output goes to stderr; raise its level with `-v` (repeatable) or `RUST_LOG`.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use advice::{error::AdviceError, parameters::RequestOverrides, prelude::*, surface::FontBook};
use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use error::AdvicedError;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Render speech-bubble captions over background images")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to the configuration file. Defaults to the platform config directory.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,
}

/// Configures the logging system based on the verbosity level
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

/// Entry point for the advice CLI
///
/// # Errors
///
/// Returns `AdvicedError` when the configuration cannot be read or written, the
/// render cannot be completed, or the settings store rejects a save.
#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
  trace!("Using config path {}", config_path.display());
  let terminal = Terminal;

  let result = run(&terminal, &config_path, cli.command).await;
  if let Err(e) = &result {
    terminal.reply(ResponseContent::Error(e))?;
  }
  result
}

/// Dispatches one subcommand.
async fn run(terminal: &Terminal, config_path: &Path, command: Commands) -> Result<()> {
  match command {
    Commands::Init(args) => init(terminal, config_path, args),
    Commands::Resolve(args) => resolve(terminal, &load(config_path)?, args).await,
    Commands::Render(args) => render(terminal, &load(config_path)?, args).await,
    Commands::Save(args) => save(terminal, &load(config_path)?, args).await,
  }
}

/// Builds the pipeline from the configuration at `path`, or from defaults if absent.
fn load(path: &Path) -> Result<Advice> {
  let config = Config::load_or_default(path)?;
  debug!("Loaded configuration: {:?}", config);
  Ok(Advice::new(config))
}
