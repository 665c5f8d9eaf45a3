//! Durable key-value storage collaborator.
//!
//! The match client persists tokens, the username, and the active match id
//! across reloads through whatever store the embedding application provides
//! (a browser's local storage, a config file, ...). Keys and values are plain
//! strings and no TTL is enforced here; staleness is only discovered when the
//! server rejects a stale token.

use std::collections::HashMap;
use std::sync::RwLock;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store. The default backing for tests and short-lived sessions;
/// embedders that need reload survival supply their own implementation.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .expect("storage lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .expect("storage lock poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .expect("storage lock poisoned")
            .remove(key);
    }
}
