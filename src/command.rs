//! Command model and the seams to the host's command pipeline.

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Owner reported for commands that do not name one
const DEFAULT_OWNER: &str = "server";

/// A command known to the host, as seen by the correction engine.
///
/// Owned by the host's registry; the engine only reads these, apart from the
/// single trigger command it installs itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownCommand {
    /// Canonical name
    pub name: String,

    /// Alternative labels, in declaration order
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Permission a sender needs to use the command, if any
    #[serde(default)]
    pub permission: Option<String>,

    /// Plugin or component that registered the command
    #[serde(default = "default_owner")]
    pub owner: String,
}

fn default_owner() -> String {
    DEFAULT_OWNER.to_string()
}

impl KnownCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            permission: None,
            owner: default_owner(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Every label the command answers to: aliases first, then the canonical name.
    pub fn name_set(&self) -> Vec<&str> {
        self.aliases
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
            .collect()
    }
}

/// Access to the host's shared name -> command table.
///
/// `lookup` and `commands` are the host's public view and always work.
/// `get`, `put` and `remove` reach into the binding table itself, which some
/// hosts do not expose; those report [`RegistryError`] instead.
pub trait CommandRegistry {
    /// Distinct commands currently bound, in registration order.
    fn commands(&self) -> Vec<Arc<KnownCommand>>;

    /// Resolve a label the way the host would when dispatching.
    fn lookup(&self, label: &str) -> Option<Arc<KnownCommand>>;

    fn get(&self, label: &str) -> Result<Option<Arc<KnownCommand>>, RegistryError>;

    /// Bind `label` to `command`, returning what was bound before.
    fn put(
        &mut self,
        label: &str,
        command: Arc<KnownCommand>,
    ) -> Result<Option<Arc<KnownCommand>>, RegistryError>;

    fn remove(&mut self, label: &str) -> Result<Option<Arc<KnownCommand>>, RegistryError>;
}

/// Everything the controller needs from the host beyond the registry.
///
/// Senders are identified by name so that console and players share one
/// identity space.
pub trait Host: CommandRegistry {
    fn has_permission(&self, sender: &str, permission: &str) -> bool;

    /// Run a command line (no leading `/`) through the normal pipeline.
    fn dispatch(&mut self, sender: &str, command_line: &str);

    fn send_message(&mut self, sender: &str, message: &str);

    /// Whether `sender` may use `command`; commands without a permission are open to all.
    fn can_use(&self, sender: &str, command: &KnownCommand) -> bool {
        match command.permission.as_deref() {
            Some(permission) => self.has_permission(sender, permission),
            None => true,
        }
    }
}
