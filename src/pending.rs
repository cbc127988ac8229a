//! Per-sender memory of the last correction offered.

use std::collections::HashMap;

/// One unconfirmed correction per sender, keyed by sender name.
#[derive(Debug, Default)]
pub struct PendingCorrectionStore {
    entries: HashMap<String, String>,
}

impl PendingCorrectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `command_line` for `sender`, replacing anything already pending.
    pub fn put(&mut self, sender: &str, command_line: impl Into<String>) {
        self.entries.insert(sender.to_string(), command_line.into());
    }

    /// Remove and return the pending correction for `sender`.
    pub fn take(&mut self, sender: &str) -> Option<String> {
        self.entries.remove(sender)
    }

    pub fn invalidate(&mut self, sender: &str) {
        self.entries.remove(sender);
    }

    pub fn peek(&self, sender: &str) -> Option<&str> {
        self.entries.get(sender).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
