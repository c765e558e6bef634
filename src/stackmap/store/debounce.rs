use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Coalesces rapid writes to the same key into one.
///
/// Scheduling a key that is already pending pushes its deadline back.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: BTreeMap<String, Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: BTreeMap::new(),
        }
    }

    pub fn schedule(&mut self, key: &str, now: Instant) {
        self.pending.insert(key.to_string(), now + self.delay);
    }

    /// Drop a pending write, typically because it was just written directly.
    pub fn cancel(&mut self, key: &str) {
        self.pending.remove(key);
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the keys whose deadline is at or before `now`.
    pub fn take_due(&mut self, now: Instant) -> Vec<String> {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &due {
            self.pending.remove(key);
        }
        due
    }

    pub fn take_all(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending).into_keys().collect()
    }
}
