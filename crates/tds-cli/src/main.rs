//! Ticket Draft Studio CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tds_cli::config::CliConfig;
use tds_cli::logging::{LogConfig, LogFormat, init_logging};
use tds_generate::BatchState;
use tds_persistence::{StateStore, StoreEvent};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, DraftsCommand, LogFormatArg, LogLevelArg};
use crate::commands::{
    App, run_drafts_clear, run_drafts_list, run_generate, run_migrate, run_reset, run_status,
};
use crate::summary::print_batch_summary;

/// Exit code when a batch is interrupted.
const EXIT_CANCELLED: i32 = 130;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let app = match open_app(&cli) {
        Ok(app) => app,
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    };

    let mut exit_code = match run_command(&app, &cli.command) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };

    if let Err(error) = app.store.shutdown_flush() {
        eprintln!("error: {}", error.user_message());
        if let Some(suggestion) = error.suggestion() {
            eprintln!("hint: {suggestion}");
        }
        exit_code = 1;
    }
    std::process::exit(exit_code);
}

fn open_app(cli: &Cli) -> Result<App> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let store = StateStore::new(config.store_config(cli.state_dir.as_deref())?);
    store.subscribe(|event| match event {
        StoreEvent::CorruptionRecovered { backup } => {
            eprintln!(
                "warning: state file was unreadable; recovered from {}",
                backup.display()
            );
        }
        StoreEvent::PersistenceWarning(error) => {
            eprintln!("warning: {}", error.user_message());
        }
        StoreEvent::Changed(_) => {}
    });
    let load = store.load_or_initialize();
    tracing::info!(source = load.source.label(), "state loaded");
    if let Some(warning) = &load.warning {
        tracing::warn!(error = %warning, "continuing without a writable state file");
    }
    Ok(App {
        store,
        config,
        load,
    })
}

fn run_command(app: &App, command: &Command) -> Result<i32> {
    match command {
        Command::Status => run_status(app),
        Command::Generate(args) => {
            let result = run_generate(app, args)?;
            print_batch_summary(&result);
            let summary = &result.summary;
            return Ok(if summary.state == BatchState::Cancelled {
                EXIT_CANCELLED
            } else if summary.failed > 0 {
                1
            } else {
                0
            });
        }
        Command::Drafts(DraftsCommand::List) => run_drafts_list(app),
        Command::Drafts(DraftsCommand::Clear) => run_drafts_clear(app)?,
        Command::Migrate { file } => run_migrate(app, file)?,
        Command::Reset { yes } => run_reset(app, *yes)?,
    }
    Ok(0)
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
