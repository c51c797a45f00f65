//! Response entries inside a named cache.
//!
//! Provides the stored response snapshot type and the per-cache handle
//! used to put, match and delete entries.

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored response snapshot.
///
/// Everything needed to replay a response to a caller without touching
/// the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub status_text: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl StoredResponse {
    /// Build a snapshot with no headers, stamped with the current time.
    pub fn new(method: &str, url: &str, status: u16, body: Vec<u8>) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url: url.to_string(),
            status,
            status_text: None,
            headers: Vec::new(),
            body,
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// Entry key for this response's request identity.
    pub fn key_hash(&self) -> String {
        compute_cache_key(&self.method, &self.url)
    }

    /// True for 2xx statuses.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Handle to one named cache.
///
/// Cheap to clone; every clone talks to the same database.
#[derive(Clone, Debug)]
pub struct Cache {
    db: CacheDb,
    name: String,
}

fn insert_entry(conn: &rusqlite::Connection, cache: &str, response: &StoredResponse) -> Result<usize, Error> {
    let headers_json = serde_json::to_string(&response.headers)?;
    let inserted = conn.execute(
        "INSERT INTO cache_entries (
            cache_name, key_hash, method, url, status, status_text, headers_json, body, stored_at
        )
        SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9
        WHERE EXISTS(SELECT 1 FROM caches WHERE name = ?1)
        ON CONFLICT(cache_name, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            cache,
            response.key_hash(),
            &response.method,
            &response.url,
            response.status as i64,
            &response.status_text,
            headers_json,
            &response.body,
            &response.stored_at,
        ],
    )?;
    Ok(inserted)
}

impl Cache {
    pub(crate) fn new(db: CacheDb, name: &str) -> Self {
        Self { db, name: name.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a response under its request identity.
    ///
    /// Last write wins for the same identity. If the cache has been purged
    /// in the meantime the response is dropped rather than resurrecting it.
    pub async fn put(&self, response: &StoredResponse) -> Result<(), Error> {
        let name = self.name.clone();
        let response = response.clone();
        let stored = self
            .db
            .conn
            .call(move |conn| -> Result<usize, Error> { insert_entry(conn, &name, &response) })
            .await
            .map_err(Error::from)?;

        if stored == 0 {
            tracing::debug!(cache = %self.name, "cache no longer exists; response not stored");
        }
        Ok(())
    }

    /// Store several responses in a single transaction.
    ///
    /// Either every response is stored or none is.
    pub async fn put_all(&self, responses: Vec<StoredResponse>) -> Result<(), Error> {
        let name = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for response in &responses {
                    if insert_entry(&tx, &name, response)? == 0 {
                        return Err(Error::CacheMiss(format!("cache {name} does not exist")));
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Find the stored response for a request identity.
    pub async fn match_request(&self, method: &str, url: &str) -> Result<Option<StoredResponse>, Error> {
        let name = self.name.clone();
        let key_hash = compute_cache_key(method, url);
        self.db
            .conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, status, status_text, headers_json, body, stored_at
                     FROM cache_entries WHERE cache_name = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![name, key_hash], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Vec<u8>>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                });

                match result {
                    Ok((method, url, status, status_text, headers_json, body, stored_at)) => Ok(Some(StoredResponse {
                        method,
                        url,
                        status: status as u16,
                        status_text,
                        headers: serde_json::from_str(&headers_json)?,
                        body,
                        stored_at,
                    })),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the entry for a request identity. Returns false if absent.
    pub async fn delete(&self, method: &str, url: &str) -> Result<bool, Error> {
        let name = self.name.clone();
        let key_hash = compute_cache_key(method, url);
        self.db
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute(
                    "DELETE FROM cache_entries WHERE cache_name = ?1 AND key_hash = ?2",
                    params![name, key_hash],
                )?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Request identities (method, url) of every entry, oldest first.
    pub async fn keys(&self) -> Result<Vec<(String, String)>, Error> {
        let name = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<(String, String)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url FROM cache_entries WHERE cache_name = ?1 ORDER BY stored_at ASC, rowid ASC",
                )?;
                let keys = stmt
                    .query_map(params![name], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(method: &str, url: &str, status: u16) -> StoredResponse {
        StoredResponse::new(method, url, status, format!("body of {url}").into_bytes())
            .with_header("Content-Type", "text/html")
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = db.open_cache("cm6-v1").await.unwrap();
        let response = make_response("GET", "http://localhost/index.html", 200);

        cache.put(&response).await.unwrap();

        let found = cache
            .match_request("GET", "http://localhost/index.html")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, response);
        assert_eq!(found.header("content-type"), Some("text/html"));
    }

    #[tokio::test]
    async fn test_match_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = db.open_cache("cm6-v1").await.unwrap();
        assert!(cache.match_request("GET", "http://localhost/nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_match_is_method_sensitive() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = db.open_cache("cm6-v1").await.unwrap();
        cache.put(&make_response("GET", "http://localhost/", 200)).await.unwrap();

        assert!(cache.match_request("POST", "http://localhost/").await.unwrap().is_none());
        assert!(cache.match_request("get", "http://localhost/").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_caches_are_isolated() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let old = db.open_cache("old-v").await.unwrap();
        let current = db.open_cache("cm6-v1").await.unwrap();
        old.put(&make_response("GET", "http://localhost/", 200)).await.unwrap();

        assert!(current.match_request("GET", "http://localhost/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_same_identity() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = db.open_cache("cm6-v1").await.unwrap();
        cache.put(&make_response("GET", "http://localhost/a.js", 200)).await.unwrap();

        let newer = StoredResponse::new("GET", "http://localhost/a.js", 200, b"v2".to_vec());
        cache.put(&newer).await.unwrap();

        let found = cache.match_request("GET", "http://localhost/a.js").await.unwrap().unwrap();
        assert_eq!(found.body, b"v2".to_vec());
        assert_eq!(cache.keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_put_into_purged_cache_is_dropped() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = db.open_cache("old-v").await.unwrap();
        db.delete_cache("old-v").await.unwrap();

        cache.put(&make_response("GET", "http://localhost/", 200)).await.unwrap();

        assert!(!db.has_cache("old-v").await.unwrap());
        assert!(cache.match_request("GET", "http://localhost/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_all_and_keys() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = db.open_cache("cm6-v1").await.unwrap();
        cache
            .put_all(vec![make_response("GET", "http://localhost/", 200), make_response("GET", "http://localhost/a.js", 200)])
            .await
            .unwrap();

        let keys = cache.keys().await.unwrap();
        assert_eq!(
            keys,
            vec![
                ("GET".to_string(), "http://localhost/".to_string()),
                ("GET".to_string(), "http://localhost/a.js".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_put_all_into_purged_cache_stores_nothing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = db.open_cache("gone").await.unwrap();
        db.delete_cache("gone").await.unwrap();

        let result = cache.put_all(vec![make_response("GET", "http://localhost/", 200)]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = db.open_cache("cm6-v1").await.unwrap();
        cache.put(&make_response("GET", "http://localhost/", 200)).await.unwrap();

        assert!(cache.delete("GET", "http://localhost/").await.unwrap());
        assert!(!cache.delete("GET", "http://localhost/").await.unwrap());
    }

    #[test]
    fn test_is_ok() {
        assert!(StoredResponse::new("GET", "http://localhost/", 200, Vec::new()).is_ok());
        assert!(StoredResponse::new("GET", "http://localhost/", 204, Vec::new()).is_ok());
        assert!(!StoredResponse::new("GET", "http://localhost/", 304, Vec::new()).is_ok());
        assert!(!StoredResponse::new("GET", "http://localhost/", 500, Vec::new()).is_ok());
    }
}
