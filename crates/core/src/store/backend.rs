//! Synchronous key-value backends for the local store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::Error;

/// A synchronous string key-value store.
///
/// Backends store raw strings; (de)serialization is the job of
/// [`LocalStore`](super::LocalStore).
pub trait KeyValueStore: Send + Sync {
    /// Raw value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>, Error>;

    /// Write `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), Error>;
}

/// Process-local backend.
///
/// An optional quota (total bytes of keys plus values) makes writes fail
/// the way a full browser storage area would.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self { items: Mutex::default(), quota: Some(quota) }
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(quota) = self.quota {
            let used: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(Error::Storage(format!("quota of {quota} bytes exceeded writing {key}")));
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), Error> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).remove(key);
        Ok(())
    }
}
