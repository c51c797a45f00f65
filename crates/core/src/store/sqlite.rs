//! SQLite backend for the local store.
//!
//! Records live in the `records` table of the app database. Access is
//! synchronous through a mutex-guarded rusqlite connection.
//!
//! Calls run inline on the async tool handlers rather than through
//! `spawn_blocking`. Each one is a single-row statement on a local file, so
//! the lock is held for microseconds.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_rusqlite::{params, rusqlite};

use super::backend::KeyValueStore;
use crate::Error;
use crate::cache::connection::PRAGMAS;
use crate::cache::migrations;

/// Record storage in SQLite.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteStorage {
    /// Open (or create) the database at `path` and run pending migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::init(rusqlite::Connection::open(path)?)
    }

    /// Open an in-memory database for testing.
    pub fn open_in_memory() -> Result<Self, Error> {
        Self::init(rusqlite::Connection::open_in_memory()?)
    }

    fn init(mut conn: rusqlite::Connection) -> Result<Self, Error> {
        conn.execute_batch(PRAGMAS)?;
        migrations::apply(&mut conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> MutexGuard<'_, rusqlite::Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        let result = self
            .conn()
            .query_row("SELECT value FROM records WHERE key = ?1", params![key], |row| row.get(0));

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        self.conn()
            .execute(
                "INSERT INTO records (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, chrono::Utc::now().to_rfc3339()],
            )
            .map_err(|e| Error::Storage(format!("writing {key}: {e}")))?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), Error> {
        self.conn()
            .execute("DELETE FROM records WHERE key = ?1", params![key])?;
        Ok(())
    }
}
