//! Configuration file
//!
//! Location: `<config dir>/notifyx/config.toml`, or `--config FILE`.
//! A missing default file is not an error; a missing explicit one is.

use anyhow::{Context, Result};
use notifyx_watcher::{EventMask, PollConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Flag names, e.g. `"CREATE|DELETE"` (default: all events)
    pub mask: Option<String>,
}

impl WatchConfig {
    pub fn mask(&self) -> Result<EventMask> {
        match &self.mask {
            Some(names) => EventMask::parse(names)
                .with_context(|| format!("Invalid [watch] mask: {}", names)),
            None => Ok(EventMask::default()),
        }
    }
}

/// Default config file path
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("notifyx").join("config.toml"))
}

/// Load `explicit`, or the default file if it exists
pub fn load(explicit: Option<&Path>) -> Result<CliConfig> {
    if let Some(path) = explicit {
        return load_from(path);
    }

    match config_file_path() {
        Some(path) if path.exists() => load_from(&path),
        _ => Ok(CliConfig::default()),
    }
}

fn load_from(path: &Path) -> Result<CliConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: CliConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    debug!("Loaded config from {}", path.display());
    Ok(config)
}
