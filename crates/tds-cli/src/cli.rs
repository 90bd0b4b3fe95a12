//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tds",
    version,
    about = "Ticket Draft Studio - Generate synthetic support-ticket emails",
    long_about = "Generate synthetic support-ticket emails for testing a helpdesk.\n\n\
                  Settings and drafts are kept in a crash-safe state file in the\n\
                  per-user config directory. Set CLAUDE_API_KEY to generate."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Config file (default: tds.toml in the config directory, if present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the state file (overrides the config file).
    #[arg(long = "state-dir", value_name = "DIR", global = true)]
    pub state_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show connections, generation settings and draft counts.
    Status,

    /// Generate a batch of drafts.
    Generate(GenerateArgs),

    /// Inspect or clear generated drafts.
    #[command(subcommand)]
    Drafts(DraftsCommand),

    /// Import a legacy KEY=VALUE configuration file.
    Migrate {
        /// Path to the legacy file.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Delete the state files and start over with defaults.
    Reset {
        /// Confirm the reset.
        #[arg(long = "yes")]
        yes: bool,
    },
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Number of drafts (default: the stored email count).
    #[arg(long = "count", value_name = "N")]
    pub count: Option<u32>,

    /// Generate three drafts without saving them.
    #[arg(long = "preview")]
    pub preview: bool,

    /// Save the preview drafts after showing them.
    #[arg(long = "promote", requires = "preview")]
    pub promote: bool,

    /// Seed for the category and priority mix.
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,
}

#[derive(Subcommand)]
pub enum DraftsCommand {
    /// List drafts in generation order.
    List,
    /// Remove all drafts. Ticket numbers are not reused.
    Clear,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
