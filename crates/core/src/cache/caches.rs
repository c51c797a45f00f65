//! Named cache management.
//!
//! A database holds any number of named caches; the controller treats the
//! one named by its version tag as current and purges the rest.

use super::connection::CacheDb;
use super::entries::Cache;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// Per-cache summary used for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheStats {
    pub name: String,
    pub created_at: String,
    pub entries: u64,
    pub bytes: u64,
}

impl CacheDb {
    /// Open the cache with the given name, creating it if absent.
    pub async fn open_cache(&self, name: &str) -> Result<Cache, Error> {
        let owned = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
                    params![owned, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(Cache::new(self.clone(), name))
    }

    /// Handle to a cache without creating it.
    ///
    /// Lookups on a cache that does not exist find nothing and puts are dropped.
    pub fn cache(&self, name: &str) -> Cache {
        Cache::new(self.clone(), name)
    }

    /// Check whether a cache with the given name exists.
    pub async fn has_cache(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM caches WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// List all cache names in creation order.
    pub async fn cache_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM caches ORDER BY created_at ASC, rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a cache and every entry in it.
    ///
    /// Returns false if no cache had that name.
    pub async fn delete_cache(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM caches WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Entry counts and body sizes for every cache, in creation order.
    pub async fn cache_stats(&self) -> Result<Vec<CacheStats>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<CacheStats>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT c.name, c.created_at, COUNT(e.key_hash), COALESCE(SUM(LENGTH(e.body)), 0)
                     FROM caches c LEFT JOIN cache_entries e ON e.cache_name = c.name
                     GROUP BY c.name
                     ORDER BY c.created_at ASC, c.rowid ASC",
                )?;
                let stats = stmt
                    .query_map([], |row| {
                        Ok(CacheStats {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                            bytes: row.get::<_, i64>(3)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(stats)
            })
            .await
            .map_err(Error::from)
    }
}
