//! Error types for the correction engine.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The host's binding table could not be read or modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Command map is not accessible: {reason}")]
    Inaccessible { reason: String },
}

impl RegistryError {
    pub fn inaccessible(reason: impl Into<String>) -> Self {
        Self::Inaccessible {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Failed to read config from {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write default config to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Error, Debug)]
pub enum OopsError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}
