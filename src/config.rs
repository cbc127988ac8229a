//! Configuration: message template, trigger aliases and instant-apply mode.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory name under the user's config directory
const CONFIG_DIR: &str = "oops";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default suggestion message: `{0}` is the prefix the sender typed, `{1}` the correction
const DEFAULT_OOPS_MESSAGE: &str = "&cDid you mean &6{0}{1}&c? Type &6{0}oops&c to run it.";

/// Default trigger aliases
const DEFAULT_ALIASES: &[&str] = &["oops", "oopsie", "whoops", "woops"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OopsConfig {
    #[serde(default)]
    pub lang: LangConfig,

    /// Trigger names claimed in the command map
    #[serde(default = "default_aliases")]
    pub aliases: Vec<String>,

    /// Run a matched correction immediately instead of waiting for confirmation
    #[serde(default)]
    pub instantly_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangConfig {
    #[serde(default = "default_oops_message")]
    pub oops: String,
}

fn default_aliases() -> Vec<String> {
    DEFAULT_ALIASES.iter().map(|s| s.to_string()).collect()
}

fn default_oops_message() -> String {
    DEFAULT_OOPS_MESSAGE.to_string()
}

impl Default for LangConfig {
    fn default() -> Self {
        Self {
            oops: default_oops_message(),
        }
    }
}

impl Default for OopsConfig {
    fn default() -> Self {
        Self {
            lang: LangConfig::default(),
            aliases: default_aliases(),
            instantly_correct: false,
        }
    }
}

impl OopsConfig {
    /// Load the config at `path`, writing the defaults there first if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config at {:?}, saving defaults", path);
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        debug!("Loaded config from {:?}: {:?}", path, config);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, content).map_err(write_error)
    }
}

/// Get the path to the default config file
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Where the controller reads its configuration from, on enable and on every reload.
pub trait ConfigSource {
    fn load(&self) -> Result<OopsConfig, ConfigError>;
}

/// A fixed configuration.
impl ConfigSource for OopsConfig {
    fn load(&self) -> Result<OopsConfig, ConfigError> {
        Ok(self.clone())
    }
}

/// Configuration backed by a JSON file, re-read on every load.
#[derive(Debug, Clone)]
pub struct FileConfig {
    path: PathBuf,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file at the default location
    pub fn default_location() -> Result<Self, ConfigError> {
        default_config_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileConfig {
    fn load(&self) -> Result<OopsConfig, ConfigError> {
        OopsConfig::load(&self.path)
    }
}
