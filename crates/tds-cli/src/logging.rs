//! Logging setup for the `tds` binary.
//!
//! Levels: `warn` for persistence warnings, failed items and retries;
//! `info` for the load source, batch lifecycle and recovered saves; `debug`
//! for saver activity and per-item progress.
//!
//! API keys are never logged; only their last four characters reach the
//! state tree.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Crates whose events follow the configured level.
const OWN_CRATES: [&str; 4] = ["tds", "tds_model", "tds_persistence", "tds_generate"];

/// What the command line decided about logging.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` override `level_filter` when set.
    pub use_env_filter: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub log_file: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
        }
    }
}

impl LogConfig {
    /// Filter directives for this config, ignoring `RUST_LOG`.
    pub fn directives(&self) -> String {
        let level = self.level_filter.to_string().to_lowercase();
        // External crates stay at warn to keep HTTP internals out of the log.
        let mut directives = LevelFilter::WARN
            .min(self.level_filter)
            .to_string()
            .to_lowercase();
        for name in OWN_CRATES {
            directives.push_str(&format!(",{name}={level}"));
        }
        directives
    }

    fn env_filter(&self) -> EnvFilter {
        if self.use_env_filter
            && let Ok(filter) = EnvFilter::try_from_default_env()
        {
            return filter;
        }
        EnvFilter::new(self.directives())
    }
}

/// Install the global tracing subscriber. Call once at startup.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let writer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };
    let base = fmt::layer()
        .with_writer(writer)
        .with_ansi(config.with_ansi)
        .with_target(false)
        .without_time();
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Pretty => base.boxed(),
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Json => base.json().boxed(),
    };
    tracing_subscriber::registry()
        .with(layer)
        .with(config.env_filter())
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_own_crates() {
        let config = LogConfig {
            level_filter: LevelFilter::DEBUG,
            ..LogConfig::default()
        };
        let directives = config.directives();
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("tds_persistence=debug"));
        assert!(directives.contains("tds_generate=debug"));
    }

    #[test]
    fn quiet_level_applies_to_dependencies_too() {
        let config = LogConfig {
            level_filter: LevelFilter::ERROR,
            ..LogConfig::default()
        };
        assert!(config.directives().starts_with("error,"));
    }
}
