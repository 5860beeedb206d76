//! Key-value persistence seam.
//!
//! The session persists exactly one thing: the id of the last successfully
//! hosted cloud anchor, so a later run can resolve it. Platform hosts wire
//! in whatever device-local storage they have; [`MemoryStore`] is the
//! default and backs tests.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Minimal string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory store. Contents do not survive the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.write().insert(key.to_string(), value.to_string());
    }
}
