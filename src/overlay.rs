//! Claiming trigger names in the host's command map and giving them back.

use crate::command::{CommandRegistry, KnownCommand};
use crate::error::RegistryError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Bindings this crate displaced while claiming its trigger names.
///
/// Only names that had a prior binding are backed up; restoring removes every
/// claimed name and puts each backup back where it was.
#[derive(Debug, Default)]
pub struct AliasOverlay {
    overridden: HashMap<String, Arc<KnownCommand>>,
}

impl AliasOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every name in `names` to `replacement`, backing up what was there.
    ///
    /// Claiming a name again before restoring keeps the original backup rather
    /// than backing up `replacement` itself. If the map refuses a write part
    /// way through, names claimed so far are restored before the error returns.
    pub fn claim<R>(
        &mut self,
        registry: &mut R,
        names: &[String],
        replacement: &Arc<KnownCommand>,
    ) -> Result<(), RegistryError>
    where
        R: CommandRegistry + ?Sized,
    {
        for (claimed, name) in names.iter().enumerate() {
            let previous = match swap_in(&mut *registry, name, replacement) {
                Ok(previous) => previous,
                Err(e) => {
                    self.restore(registry, &names[..claimed]);
                    return Err(e);
                }
            };

            let Some(previous) = previous else {
                continue;
            };
            if Arc::ptr_eq(&previous, replacement) {
                continue;
            }
            info!(
                "Overriding {} by {}. Aliases: {:?}",
                name, previous.owner, previous.aliases
            );
            self.overridden.insert(name.clone(), previous);
        }
        Ok(())
    }

    /// Unbind every name in `names` and put back whatever each one displaced.
    ///
    /// Never fails: this runs during shutdown, and an inaccessible map was
    /// already reported when claiming.
    pub fn restore<R>(&mut self, registry: &mut R, names: &[String])
    where
        R: CommandRegistry + ?Sized,
    {
        for name in names {
            if let Err(e) = registry.remove(name) {
                debug!("Skipping restore of '{}': {}", name, e);
                continue;
            }
            if let Some(previous) = self.overridden.remove(name) {
                if let Err(e) = registry.put(name, previous) {
                    debug!("Could not rebind '{}': {}", name, e);
                }
            }
        }
    }

    pub fn backup(&self, name: &str) -> Option<&Arc<KnownCommand>> {
        self.overridden.get(name)
    }

    /// Whether no displaced bindings are waiting to be restored.
    pub fn is_drained(&self) -> bool {
        self.overridden.is_empty()
    }
}

/// Read the current binding for `name`, then bind `replacement` in its place.
fn swap_in<R>(
    registry: &mut R,
    name: &str,
    replacement: &Arc<KnownCommand>,
) -> Result<Option<Arc<KnownCommand>>, RegistryError>
where
    R: CommandRegistry + ?Sized,
{
    let previous = registry.get(name)?;
    registry.put(name, Arc::clone(replacement))?;
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_map::CommandMap;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn host_map() -> CommandMap {
        CommandMap::from_catalog([
            KnownCommand::new("fix").with_owner("Essentials"),
            KnownCommand::new("help").with_aliases(["?"]),
        ])
    }

    fn snapshot(map: &CommandMap) -> Vec<(String, String)> {
        map.labels()
            .into_iter()
            .map(|label| {
                let owner = map.lookup(&label).unwrap().name.clone();
                (label, owner)
            })
            .collect()
    }

    /// Binding table whose writes do not report what they displaced.
    struct SilentPuts(CommandMap);

    impl CommandRegistry for SilentPuts {
        fn commands(&self) -> Vec<Arc<KnownCommand>> {
            self.0.commands()
        }

        fn lookup(&self, label: &str) -> Option<Arc<KnownCommand>> {
            self.0.lookup(label)
        }

        fn get(&self, label: &str) -> Result<Option<Arc<KnownCommand>>, RegistryError> {
            self.0.get(label)
        }

        fn put(
            &mut self,
            label: &str,
            command: Arc<KnownCommand>,
        ) -> Result<Option<Arc<KnownCommand>>, RegistryError> {
            self.0.put(label, command).map(|_| None)
        }

        fn remove(&mut self, label: &str) -> Result<Option<Arc<KnownCommand>>, RegistryError> {
            self.0.remove(label)
        }
    }

    #[test]
    fn test_claim_reads_binding_before_writing() {
        let mut registry = SilentPuts(host_map());
        let mut overlay = AliasOverlay::new();
        let trigger = Arc::new(KnownCommand::new("oops"));
        let claimed = names(&["fix"]);

        overlay.claim(&mut registry, &claimed, &trigger).unwrap();
        assert_eq!(overlay.backup("fix").unwrap().owner, "Essentials");

        overlay.restore(&mut registry, &claimed);
        assert_eq!(registry.lookup("fix").unwrap().owner, "Essentials");
    }

    #[test]
    fn test_claim_binds_and_backs_up_existing() {
        let mut map = host_map();
        let mut overlay = AliasOverlay::new();
        let trigger = Arc::new(KnownCommand::new("oops"));

        overlay
            .claim(&mut map, &names(&["oops", "fix"]), &trigger)
            .unwrap();

        assert!(Arc::ptr_eq(&map.lookup("oops").unwrap(), &trigger));
        assert!(Arc::ptr_eq(&map.lookup("fix").unwrap(), &trigger));
        assert_eq!(overlay.backup("fix").unwrap().owner, "Essentials");
        assert!(overlay.backup("oops").is_none());
    }

    #[test]
    fn test_claim_then_restore_round_trips() {
        let mut map = host_map();
        let before = snapshot(&map);
        let original_fix = map.lookup("fix").unwrap();
        let mut overlay = AliasOverlay::new();
        let trigger = Arc::new(KnownCommand::new("oops"));
        let claimed = names(&["oops", "fix", "?"]);

        overlay.claim(&mut map, &claimed, &trigger).unwrap();
        overlay.restore(&mut map, &claimed);

        assert_eq!(snapshot(&map), before);
        assert!(Arc::ptr_eq(&map.lookup("fix").unwrap(), &original_fix));
        assert!(map.lookup("oops").is_none());
        assert!(overlay.is_drained());
    }

    #[test]
    fn test_reclaim_does_not_back_up_itself() {
        let mut map = host_map();
        let mut overlay = AliasOverlay::new();
        let trigger = Arc::new(KnownCommand::new("oops"));
        let claimed = names(&["fix"]);

        overlay.claim(&mut map, &claimed, &trigger).unwrap();
        overlay.claim(&mut map, &claimed, &trigger).unwrap();
        assert_eq!(overlay.backup("fix").unwrap().name, "fix");

        overlay.restore(&mut map, &claimed);
        assert_eq!(map.lookup("fix").unwrap().owner, "Essentials");
    }

    #[test]
    fn test_claim_on_sealed_map_fails() {
        let mut map = host_map();
        map.seal();
        let mut overlay = AliasOverlay::new();
        let trigger = Arc::new(KnownCommand::new("oops"));

        let result = overlay.claim(&mut map, &names(&["oops"]), &trigger);
        assert!(matches!(result, Err(RegistryError::Inaccessible { .. })));
        assert!(overlay.is_drained());
    }

    #[test]
    fn test_restore_on_sealed_map_is_silent() {
        let mut map = host_map();
        let mut overlay = AliasOverlay::new();
        let trigger = Arc::new(KnownCommand::new("oops"));
        let claimed = names(&["oops", "fix"]);
        overlay.claim(&mut map, &claimed, &trigger).unwrap();

        map.seal();
        overlay.restore(&mut map, &claimed);

        map.unseal();
        assert!(map.lookup("oops").is_some());
        assert!(overlay.backup("fix").is_some());
    }
}
