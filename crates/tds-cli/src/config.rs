//! CLI configuration file.
//!
//! An optional TOML file supplies the state directory, the legacy file to
//! import on first start, a category catalog, and provider settings. The
//! Claude API key is read from [`API_KEY_ENV`] and never written anywhere.
//!
//! ```toml
//! state_dir = "/home/me/.config/tds"
//! legacy_path = "/home/me/old/.env"
//! catalog_path = "/home/me/categories.csv"
//!
//! [autosave]
//! debounce_ms = 500
//!
//! [claude]
//! model = "claude-3-5-haiku-20241022"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tds_generate::ClaudeConfig;
use tds_persistence::{AutoSaveConfig, StoreConfig, default_state_dir};

/// Environment variable holding the Claude API key.
pub const API_KEY_ENV: &str = "CLAUDE_API_KEY";

/// Config file name inside the per-user config directory.
pub const CONFIG_FILENAME: &str = "tds.toml";

/// Settings read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub state_dir: Option<PathBuf>,
    pub legacy_path: Option<PathBuf>,
    /// CSV with `Category`, `Sub-Category`, `Item` columns.
    pub catalog_path: Option<PathBuf>,
    pub autosave: AutoSaveConfig,
    pub claude: ClaudeConfig,
}

impl CliConfig {
    /// Load `explicit` if given, otherwise the default file if it exists.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Store configuration; `state_dir` overrides the file's value.
    pub fn store_config(&self, state_dir: Option<&Path>) -> Result<StoreConfig> {
        let dir = state_dir
            .map(Path::to_path_buf)
            .or_else(|| self.state_dir.clone())
            .or_else(default_state_dir)
            .ok_or_else(|| anyhow!("no state directory configured and no home directory found"))?;
        let mut config = StoreConfig::new(dir).with_autosave(self.autosave.clone());
        if let Some(legacy) = &self.legacy_path {
            config = config.with_legacy_path(legacy);
        }
        Ok(config)
    }
}

/// `<config dir>/tds.toml`, if a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "TicketDraftStudio", "TDS")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// The Claude API key from the environment, if set and non-empty.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}
