//! Local record store.
//!
//! A JSON persistence facade over a synchronous key-value backend, shared
//! by every feature module.
//!
//! ### Reads never fail
//! - A missing record yields the caller's fallback.
//! - A record that does not deserialize into the requested type is corrupt:
//!   it is deleted and the fallback is returned, so one bad write cannot
//!   poison the key for good.
//! - Backend read errors are logged and treated as a missing record.
//!
//! ### Writes do
//! - `set` returns serialization and backend errors (e.g. quota exceeded)
//!   to the caller. Nothing is retried.
//! - `update` holds the store's write lock from load to store, so two
//!   read-modify-write cycles on the same store never interleave.

pub mod backend;
pub mod keys;
pub mod sqlite;

pub use backend::{KeyValueStore, MemoryStorage};
pub use sqlite::SqliteStorage;

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Error;

/// JSON record store over a [`KeyValueStore`] backend.
#[derive(Debug)]
pub struct LocalStore<S: KeyValueStore> {
    backend: S,
    writes: Mutex<()>,
}

impl<S: KeyValueStore> LocalStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend, writes: Mutex::new(()) }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Read the record at `key`, or `fallback` if it is missing or corrupt.
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.get_opt(key).unwrap_or(fallback)
    }

    /// Read the record at `key`, or `None` if it is missing or corrupt.
    ///
    /// Corrupt records are evicted as a side effect.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "record read failed; using fallback");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "evicting corrupt record");
                if let Err(e) = self.backend.remove_item(key) {
                    tracing::warn!(key, error = %e, "failed to evict corrupt record");
                }
                None
            }
        }
    }

    /// Serialize `value` and write it under `key`.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), Error> {
        let raw = serde_json::to_string(value)?;
        self.backend.set_item(key, &raw)
    }

    /// Load the record at `key` (or `fallback`), apply `change` and write it back.
    ///
    /// Nothing is written when `change` fails.
    pub fn update<T, R>(
        &self, key: &str, fallback: T, change: impl FnOnce(&mut T) -> Result<R, Error>,
    ) -> Result<R, Error>
    where
        T: Serialize + DeserializeOwned,
    {
        let _guard = self.writes.lock().unwrap_or_else(PoisonError::into_inner);
        let mut value = self.get(key, fallback);
        let out = change(&mut value)?;
        self.set(key, &value)?;
        Ok(out)
    }

    /// Delete the record at `key`.
    pub fn remove(&self, key: &str) -> Result<(), Error> {
        self.backend.remove_item(key)
    }
}
