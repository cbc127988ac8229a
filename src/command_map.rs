//! In-memory command map.
//!
//! Labels are stored lowercased. Commands keep the order in which they were
//! first bound, which makes catalog enumeration (and therefore the matcher's
//! tie-break) deterministic.

use crate::command::{CommandRegistry, KnownCommand};
use crate::error::RegistryError;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct CommandMap {
    known: HashMap<String, Arc<KnownCommand>>,
    order: Vec<Arc<KnownCommand>>,
    sealed: bool,
}

impl CommandMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from a catalog, registering each command under its name and aliases.
    pub fn from_catalog(catalog: impl IntoIterator<Item = KnownCommand>) -> Self {
        let mut map = Self::new();
        for command in catalog {
            map.register(command);
        }
        map
    }

    /// Register a command under its canonical name and aliases.
    ///
    /// Labels already taken keep their current binding, the way a host
    /// resolves alias conflicts in favour of the first registration.
    pub fn register(&mut self, command: KnownCommand) -> Arc<KnownCommand> {
        let command = Arc::new(command);
        let name = command.name.to_lowercase();
        self.known.insert(name, Arc::clone(&command));
        for alias in &command.aliases {
            let alias = alias.to_lowercase();
            self.known
                .entry(alias)
                .or_insert_with(|| Arc::clone(&command));
        }
        self.track(&command);
        command
    }

    /// Hide the binding table, as a host without an accessible command map would.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn unseal(&mut self) {
        self.sealed = false;
    }

    /// Labels currently bound, sorted.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.known.keys().cloned().collect();
        labels.sort();
        labels
    }

    fn track(&mut self, command: &Arc<KnownCommand>) {
        if !self.order.iter().any(|known| Arc::ptr_eq(known, command)) {
            self.order.push(Arc::clone(command));
        }
    }

    fn check_access(&self) -> Result<(), RegistryError> {
        if self.sealed {
            return Err(RegistryError::inaccessible("binding table is sealed"));
        }
        Ok(())
    }
}

impl CommandRegistry for CommandMap {
    fn commands(&self) -> Vec<Arc<KnownCommand>> {
        self.order
            .iter()
            .filter(|command| self.known.values().any(|bound| Arc::ptr_eq(bound, command)))
            .cloned()
            .collect()
    }

    fn lookup(&self, label: &str) -> Option<Arc<KnownCommand>> {
        self.known.get(&label.to_lowercase()).cloned()
    }

    fn get(&self, label: &str) -> Result<Option<Arc<KnownCommand>>, RegistryError> {
        self.check_access()?;
        Ok(self.lookup(label))
    }

    fn put(
        &mut self,
        label: &str,
        command: Arc<KnownCommand>,
    ) -> Result<Option<Arc<KnownCommand>>, RegistryError> {
        self.check_access()?;
        self.track(&command);
        Ok(self.known.insert(label.to_lowercase(), command))
    }

    fn remove(&mut self, label: &str) -> Result<Option<Arc<KnownCommand>>, RegistryError> {
        self.check_access()?;
        let removed = self.known.remove(&label.to_lowercase());
        if let Some(command) = &removed {
            if !self.known.values().any(|bound| Arc::ptr_eq(bound, command)) {
                self.order.retain(|known| !Arc::ptr_eq(known, command));
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CommandMap {
        CommandMap::from_catalog([
            KnownCommand::new("help").with_aliases(["?"]),
            KnownCommand::new("teleport").with_aliases(["tp"]),
            KnownCommand::new("version").with_aliases(["ver"]),
        ])
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let map = sample();
        assert_eq!(map.lookup("TP").unwrap().name, "teleport");
        assert!(map.lookup("tpp").is_none());
    }

    #[test]
    fn test_commands_keep_registration_order() {
        let map = sample();
        let names: Vec<String> = map.commands().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["help", "teleport", "version"]);
    }

    #[test]
    fn test_alias_conflict_keeps_first_binding() {
        let mut map = sample();
        map.register(KnownCommand::new("tpa").with_aliases(["tp"]));
        assert_eq!(map.lookup("tp").unwrap().name, "teleport");
        assert_eq!(map.lookup("tpa").unwrap().name, "tpa");
    }

    #[test]
    fn test_unbound_commands_leave_the_catalog() {
        let mut map = sample();
        map.remove("version").unwrap();
        assert_eq!(map.commands().len(), 3);
        map.remove("ver").unwrap();
        let names: Vec<String> = map.commands().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["help", "teleport"]);
    }

    #[test]
    fn test_remove_forgets_commands_no_longer_bound() {
        let mut map = sample();
        for _ in 0..3 {
            let trigger = Arc::new(KnownCommand::new("oops"));
            map.put("oops", Arc::clone(&trigger)).unwrap();
            map.put("fix", trigger).unwrap();
            map.remove("oops").unwrap();
            map.remove("fix").unwrap();
        }
        assert_eq!(map.order.len(), 3);
        assert_eq!(map.commands().len(), 3);
    }

    #[test]
    fn test_sealed_map_rejects_binding_access() {
        let mut map = sample();
        map.seal();
        assert!(map.get("help").is_err());
        assert!(map.remove("help").is_err());
        assert!(map
            .put("oops", Arc::new(KnownCommand::new("oops")))
            .is_err());
        // Public lookup still works
        assert!(map.lookup("help").is_some());
        map.unseal();
        assert!(map.get("help").unwrap().is_some());
    }
}
