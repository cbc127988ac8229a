//! Oops - typo correction for console commands
//!
//! Intercepts command lines before the host runs them. An unknown command
//! that is a few edits away from a known one produces a suggestion, which the
//! sender confirms with the trigger command (`/oops` by default), or which is
//! run straight away in instant mode.
//!
//! The host is reached only through [`CommandRegistry`] and [`Host`]; the
//! in-memory [`CommandMap`] implements the registry for consoles and tests.

pub mod command;
pub mod command_map;
pub mod config;
pub mod controller;
pub mod error;
pub mod lang;
pub mod matcher;
pub mod overlay;
pub mod pending;

pub use command::{CommandRegistry, Host, KnownCommand};
pub use command_map::CommandMap;
pub use config::{ConfigSource, FileConfig, OopsConfig};
pub use controller::{CorrectionController, Outcome};
pub use error::{ConfigError, OopsError, RegistryError};
pub use overlay::AliasOverlay;
pub use pending::PendingCorrectionStore;
