/// App configuration
///
/// Optional TOML file at `<config_dir>/tododemo/config.toml`. Every field has
/// a default, so a missing file is not an error.

use crate::error::{Result, TodoError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "tododemo";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "tasks.db";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the task store lives
    pub database_path: Option<PathBuf>,
    /// tracing filter used when RUST_LOG is unset, e.g. "tododemo=debug"
    pub log_filter: Option<String>,
}

impl Config {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("no config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from an explicit file; a missing file gives the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Configured database path, or the platform data directory
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir().ok_or_else(|| {
            TodoError::Config("Could not determine data directory".to_string())
        })?;
        Ok(data_dir.join(APP_DIR).join(DATABASE_FILE))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
