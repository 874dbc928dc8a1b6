//! Persisted session credentials.
//!
//! The production backend is the OS credential store (DPAPI on Windows,
//! Keychain on macOS, Secret Service on Linux) via the `keyring` crate. An
//! in-memory backend is provided for tests and for embedding the client in
//! processes that must not touch the OS store.

use std::collections::HashMap;
use std::sync::Mutex;

use keyring::Entry;
use tracing::{info, warn};

use crate::error::StorageError;

/// Default keyring service name.
pub const DEFAULT_SERVICE_NAME: &str = "lily-backoffice";

// Credential keys
pub const KEY_TOKEN: &str = "token";
pub const KEY_ROLE: &str = "role";
pub const KEY_NAME: &str = "name";
pub const KEY_USER_ID: &str = "user_id";

/// All credential keys making up a persisted session.
pub const SESSION_KEYS: &[&str] = &[KEY_TOKEN, KEY_ROLE, KEY_NAME, KEY_USER_ID];

/// Key/value store for the persisted session.
///
/// Reads never fail: a missing or unreadable entry is `None`, matching how the
/// session treats "nothing persisted".
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Silently succeeds if the entry does not exist.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// OS keyring
// ---------------------------------------------------------------------------

pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, keyring::Error> {
        Entry::new(&self.service, key)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_NAME)
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, key: &str) -> Option<String> {
        let entry = match self.entry(key) {
            Ok(e) => e,
            Err(e) => {
                warn!(key, error = %e, "keyring: failed to create entry");
                return None;
            }
        };
        match entry.get_password() {
            Ok(pw) => Some(pw),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(key, error = %e, "keyring: failed to read credential");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let entry = self
            .entry(key)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entry.set_password(value).map_err(|e| StorageError::Write {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let entry = self
            .entry(key)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::Write {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// High-level helpers
// ---------------------------------------------------------------------------

/// Delete every persisted session key.
///
/// Every key is attempted even after a failure; the first error is returned.
pub fn clear_session(store: &dyn CredentialStore) -> Result<(), StorageError> {
    let mut first_error = None;
    for key in SESSION_KEYS {
        if let Err(e) = store.delete(key) {
            warn!(key, error = %e, "failed to delete persisted credential");
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => {
            info!("persisted session cleared");
            Ok(())
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_and_deletes() {
        let store = MemoryStore::new();
        assert_eq!(store.get(KEY_TOKEN), None);

        store.set(KEY_TOKEN, "abc").unwrap();
        assert_eq!(store.get(KEY_TOKEN).as_deref(), Some("abc"));

        store.delete(KEY_TOKEN).unwrap();
        assert_eq!(store.get(KEY_TOKEN), None);
        // deleting again is not an error
        store.delete(KEY_TOKEN).unwrap();
    }

    #[test]
    fn clear_session_removes_all_session_keys_only() {
        let store = MemoryStore::new();
        for key in SESSION_KEYS {
            store.set(key, "x").unwrap();
        }
        store.set("printer_port", "5003").unwrap();

        clear_session(&store).unwrap();

        for key in SESSION_KEYS {
            assert_eq!(store.get(key), None, "{key} should be cleared");
        }
        assert_eq!(store.get("printer_port").as_deref(), Some("5003"));
    }

    #[test]
    fn clear_session_keeps_going_after_a_failed_delete() {
        let store = test_support::FailingStore {
            fail_delete: Some(KEY_ROLE),
            ..Default::default()
        };
        for key in SESSION_KEYS {
            store.inner.set(key, "x").unwrap();
        }

        let err = clear_session(&store).unwrap_err();
        assert!(matches!(err, StorageError::Write { ref key, .. } if key == KEY_ROLE));

        assert_eq!(store.get(KEY_TOKEN), None);
        assert_eq!(store.get(KEY_ROLE).as_deref(), Some("x"));
        assert_eq!(store.get(KEY_NAME), None);
        assert_eq!(store.get(KEY_USER_ID), None);
    }
}
