//! Correction controller: reacts to intercepted command lines and the trigger.
//!
//! Per sender the controller is either idle or holding one pending correction.
//! An unknown command close to a known label produces a suggestion (or runs
//! the correction straight away in instant mode). Typing a trigger alias runs
//! the pending correction; any other valid command drops it.

use crate::command::{Host, KnownCommand};
use crate::config::{ConfigSource, OopsConfig};
use crate::error::OopsError;
use crate::lang;
use crate::matcher;
use crate::overlay::AliasOverlay;
use crate::pending::PendingCorrectionStore;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Canonical name of the trigger command
pub const TRIGGER_COMMAND: &str = "oops";

/// Permission needed for `/oops reload`
pub const RELOAD_PERMISSION: &str = "oops.reload";

/// Prefix players type in front of commands
const COMMAND_PREFIX: char = '/';

const RELOAD_ARGUMENT: &str = "reload";
const RELOAD_SUCCESS: &str = "Oops configuration reloaded successfully!";
const RELOAD_FAILURE: &str = "Oops configuration could not be reloaded, keeping the previous one.";

/// What the host should do with the intercepted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Let normal processing continue
    Pass,
    /// The controller handled it; skip normal processing
    Suppress,
}

/// An intercepted command line split into name and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// Lowercased command name without prefix
    pub name: String,
    /// Everything from the first space on, kept verbatim
    pub remainder: &'a str,
    /// Whether the sender typed the `/` prefix
    pub prefixed: bool,
}

impl<'a> CommandLine<'a> {
    pub fn parse(raw: &'a str) -> Option<Self> {
        let prefixed = raw.starts_with(COMMAND_PREFIX);
        let body = if prefixed { &raw[COMMAND_PREFIX.len_utf8()..] } else { raw };
        let (name, remainder) = match body.find(' ') {
            Some(space) => body.split_at(space),
            None => (body, ""),
        };
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_lowercase(),
            remainder,
            prefixed,
        })
    }

    fn prefix(&self) -> &'static str {
        if self.prefixed {
            "/"
        } else {
            ""
        }
    }

    fn first_argument(&self) -> Option<&'a str> {
        self.remainder.split_whitespace().next()
    }
}

pub struct CorrectionController<C: ConfigSource> {
    source: C,
    config: OopsConfig,
    /// Suggestion template with colour codes translated
    message: String,
    /// Lowercased trigger names, claimed in the command map
    triggers: Vec<String>,
    trigger_command: Arc<KnownCommand>,
    overlay: AliasOverlay,
    /// Whether the trigger names are currently bound
    claimed: bool,
    pending: PendingCorrectionStore,
}

impl<C: ConfigSource> CorrectionController<C> {
    /// Load configuration and claim the trigger names.
    ///
    /// A command map that cannot be modified is reported and leaves the
    /// triggers unbound; corrections still work through interception.
    pub fn enable<H: Host>(source: C, host: &mut H) -> Result<Self, OopsError> {
        let config = source.load()?;
        let mut controller = Self {
            source,
            config: OopsConfig::default(),
            message: String::new(),
            triggers: Vec::new(),
            trigger_command: Arc::new(KnownCommand::new(TRIGGER_COMMAND)),
            overlay: AliasOverlay::new(),
            claimed: false,
            pending: PendingCorrectionStore::new(),
        };
        controller.load(host, config);
        Ok(controller)
    }

    /// Give back every claimed name and forget pending corrections.
    pub fn disable<H: Host>(mut self, host: &mut H) {
        self.unload(host);
    }

    /// Unload, re-read configuration and load again.
    ///
    /// Pending corrections never survive a reload. If the configuration
    /// cannot be read, the previous one is loaded again.
    pub fn reload<H: Host>(&mut self, host: &mut H) -> Result<(), OopsError> {
        self.unload(host);
        match self.source.load() {
            Ok(config) => {
                self.load(host, config);
                Ok(())
            }
            Err(e) => {
                let previous = self.config.clone();
                self.load(host, previous);
                Err(e.into())
            }
        }
    }

    /// Handle a raw command line before the host processes it.
    pub fn handle_input<H: Host>(&mut self, host: &mut H, sender: &str, raw: &str) -> Outcome {
        let Some(line) = CommandLine::parse(raw) else {
            return Outcome::Pass;
        };

        if self.is_trigger(&line.name) {
            self.handle_trigger(host, sender, &line);
            return Outcome::Suppress;
        }

        if host.lookup(&line.name).is_some() {
            // Something else valid: the old suggestion no longer applies.
            self.pending.invalidate(sender);
            return Outcome::Pass;
        }

        let candidate = {
            let host_view: &H = host;
            matcher::find_correction(host_view, &line.name, |command| {
                host_view.can_use(sender, command)
            })
        };
        let Some(candidate) = candidate else {
            return Outcome::Pass;
        };

        if self.config.instantly_correct {
            let corrected = format!("{}{}", candidate, line.remainder);
            debug!("Instantly correcting '{}' to '{}' for {}", raw, corrected, sender);
            host.dispatch(sender, &corrected);
            return Outcome::Suppress;
        }

        let message = lang::format_suggestion(&self.message, line.prefix(), &candidate);
        host.send_message(sender, &message);
        if self.is_trigger(&candidate) {
            // The trigger would only run itself.
            return Outcome::Suppress;
        }

        let corrected = format!("{}{}", candidate, line.remainder);
        debug!("Storing correction '{}' for {}", corrected, sender);
        self.pending.put(sender, corrected);
        Outcome::Suppress
    }

    pub fn pending_for(&self, sender: &str) -> Option<&str> {
        self.pending.peek(sender)
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn config(&self) -> &OopsConfig {
        &self.config
    }

    /// Whether the trigger names are bound in the command map.
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    fn is_trigger(&self, name: &str) -> bool {
        self.triggers.iter().any(|trigger| trigger == name)
    }

    fn handle_trigger<H: Host>(&mut self, host: &mut H, sender: &str, line: &CommandLine<'_>) {
        let wants_reload = line
            .first_argument()
            .is_some_and(|arg| arg.eq_ignore_ascii_case(RELOAD_ARGUMENT));
        if wants_reload && host.has_permission(sender, RELOAD_PERMISSION) {
            match self.reload(host) {
                Ok(()) => host.send_message(sender, RELOAD_SUCCESS),
                Err(e) => {
                    error!("Reload requested by {} failed: {}", sender, e);
                    host.send_message(sender, RELOAD_FAILURE);
                }
            }
            return;
        }

        match self.pending.take(sender) {
            Some(corrected) => {
                debug!("Running correction '{}' for {}", corrected, sender);
                host.dispatch(sender, &corrected);
            }
            None => debug!("Nothing pending for {}", sender),
        }
    }

    fn load<H: Host>(&mut self, host: &mut H, config: OopsConfig) {
        self.message = lang::translate_color_codes(&config.lang.oops);
        self.triggers = trigger_names(&config);
        self.trigger_command = Arc::new(
            KnownCommand::new(TRIGGER_COMMAND)
                .with_aliases(
                    self.triggers
                        .iter()
                        .filter(|name| name.as_str() != TRIGGER_COMMAND)
                        .cloned(),
                )
                .with_owner(TRIGGER_COMMAND),
        );
        self.config = config;

        match self
            .overlay
            .claim(host, &self.triggers, &self.trigger_command)
        {
            Ok(()) => {
                self.claimed = true;
                info!("Registered trigger aliases: {:?}", self.triggers);
            }
            Err(e) => {
                self.claimed = false;
                error!(
                    "Unable to modify the command map! No aliases will be registered! ({})",
                    e
                );
            }
        }
    }

    fn unload<H: Host>(&mut self, host: &mut H) {
        if self.claimed {
            self.overlay.restore(host, &self.triggers);
            self.claimed = false;
            if !self.overlay.is_drained() {
                warn!("Some overridden commands could not be restored");
            }
        }
        self.pending.clear();
    }
}

/// Configured aliases plus the canonical trigger name, lowercased and de-duplicated.
fn trigger_names(config: &OopsConfig) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(config.aliases.len() + 1);
    let all = config
        .aliases
        .iter()
        .map(|alias| alias.to_lowercase())
        .chain(std::iter::once(TRIGGER_COMMAND.to_string()));
    for name in all {
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
