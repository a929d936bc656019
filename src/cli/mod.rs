//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `psu-remote send` - Set and confirm a voltage or current
//! - `psu-remote ports` - List serial ports
//! - `psu-remote version` - Show the build version status
//! - `psu-remote stamp` - Write a build manifest for an executable
//! - `psu-remote validate` - Classify operator input without sending
//! - `psu-remote history` - View past exchanges

mod history;
mod ports;
mod send;
mod stamp;
mod validate;
mod version;

pub use history::HistoryCommand;
pub use ports::PortsCommand;
pub use send::SendCommand;
pub use stamp::StampCommand;
pub use validate::ValidateCommand;
pub use version::VersionCommand;

use crate::config::{AppSettings, Paths};
use crate::error::{CliError, CliResult};
use crate::output;
use crate::storage::HistoryStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

/// psu-remote - set and confirm bench power supply outputs over serial.
///
/// Values are checked against the instrument's limits before anything is
/// sent, and every set command is followed by a query to confirm the
/// instrument accepted it.
#[derive(Parser, Debug)]
#[command(name = "psu-remote")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Remote set-point control for serial bench power supplies", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom settings file
    #[arg(long, global = true, value_name = "PATH", env = "PSU_REMOTE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set a voltage or current and confirm it
    #[command(alias = "s")]
    Send(SendCommand),

    /// List available serial ports
    #[command(alias = "p")]
    Ports(PortsCommand),

    /// Show the build version status
    Version(VersionCommand),

    /// Write a build manifest for an executable
    Stamp(StampCommand),

    /// Check port and value input without sending anything
    Validate(ValidateCommand),

    /// View exchange history
    #[command(alias = "h")]
    History(HistoryCommand),
}

impl Cli {
    /// Run the selected subcommand.
    pub async fn run(self) -> CliResult<()> {
        let ctx = Context::load(self.config.as_ref(), self.verbose, self.quiet)?;

        match self.command {
            Commands::Send(cmd) => cmd.execute(&ctx).await,
            Commands::Ports(cmd) => cmd.execute(&ctx),
            Commands::Version(cmd) => cmd.execute(&ctx),
            Commands::Stamp(cmd) => cmd.execute(&ctx),
            Commands::Validate(cmd) => cmd.execute(&ctx),
            Commands::History(cmd) => cmd.execute(&ctx),
        }
    }
}

/// Settings and flags shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: AppSettings,
    pub paths: Option<Paths>,
    pub verbose: bool,
    pub quiet: bool,
}

impl Context {
    /// Load settings from `config`, or from the platform config directory.
    ///
    /// A missing platform directory is not fatal: defaults are used and
    /// history is disabled.
    pub fn load(config: Option<&PathBuf>, verbose: bool, quiet: bool) -> CliResult<Self> {
        let paths = match Paths::resolve() {
            Ok(paths) => Some(paths),
            Err(e) => {
                warn!(error = %e, "platform directories unavailable");
                None
            }
        };

        let settings = match (config, &paths) {
            (Some(path), _) => AppSettings::load_from(path)?,
            (None, Some(paths)) => AppSettings::load(paths)?,
            (None, None) => AppSettings::default(),
        };

        Ok(Self {
            settings,
            paths,
            verbose,
            quiet,
        })
    }

    /// The exchange history store, if a data directory is available.
    pub fn history(&self) -> CliResult<Option<HistoryStore>> {
        match &self.paths {
            Some(paths) => Ok(Some(HistoryStore::open(paths.history_dir())?)),
            None => Ok(None),
        }
    }

    /// Print an info line unless quiet.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            output::print_info(msg);
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for spreadsheets
    Csv,
}

impl OutputFormat {
    /// Fail for CSV on commands whose result is not a table.
    pub fn reject_csv(self, command: &str) -> CliResult<()> {
        if self == Self::Csv {
            return Err(CliError::Other(format!(
                "csv output is not available for '{}', use plain or json",
                command
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}
