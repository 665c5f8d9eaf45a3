//! Credential and session state over the durable key-value store.

use std::sync::{Arc, Mutex};

use crate::constants::{KEY_ACCESS_TOKEN, KEY_ACTIVE_MATCH, KEY_REFRESH_TOKEN, KEY_USERNAME};
use crate::storage::KeyValueStore;

/// Single owner of the credential set.
///
/// Exactly one live access/refresh token pair exists per authenticated
/// session: set on auth success, replaced wholesale on renewal, destroyed on
/// logout or irrecoverable renewal failure. Reads go straight to the backing
/// store so a reload of the embedding application picks the session back up.
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStore>,
    // Serializes multi-key writes so a credential overwrite is never
    // observed half-done.
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Unconditional overwrite of both tokens.
    pub fn set_credentials(&self, access_token: &str, refresh_token: &str) {
        let _guard = self.write_lock.lock().expect("credential lock poisoned");
        self.storage.set(KEY_ACCESS_TOKEN, access_token);
        self.storage.set(KEY_REFRESH_TOKEN, refresh_token);
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage.get(KEY_ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(KEY_REFRESH_TOKEN)
    }

    /// Removes both tokens. Idempotent.
    pub fn clear_credentials(&self) {
        let _guard = self.write_lock.lock().expect("credential lock poisoned");
        self.storage.remove(KEY_ACCESS_TOKEN);
        self.storage.remove(KEY_REFRESH_TOKEN);
    }

    /// Presence check only: an expired-but-present token still reads as
    /// authenticated until a request fails.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    pub fn set_username(&self, username: &str) {
        self.storage.set(KEY_USERNAME, username);
    }

    pub fn username(&self) -> Option<String> {
        self.storage.get(KEY_USERNAME)
    }

    pub fn set_active_match(&self, match_id: &str) {
        self.storage.set(KEY_ACTIVE_MATCH, match_id);
    }

    pub fn active_match(&self) -> Option<String> {
        self.storage.get(KEY_ACTIVE_MATCH)
    }

    pub fn clear_active_match(&self) {
        self.storage.remove(KEY_ACTIVE_MATCH);
    }

    /// Full logout: tokens, username, and the active match id.
    pub fn clear_session(&self) {
        let _guard = self.write_lock.lock().expect("credential lock poisoned");
        self.storage.remove(KEY_ACCESS_TOKEN);
        self.storage.remove(KEY_REFRESH_TOKEN);
        self.storage.remove(KEY_USERNAME);
        self.storage.remove(KEY_ACTIVE_MATCH);
    }
}
