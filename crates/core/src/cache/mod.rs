//! SQLite-backed storage for versioned response caches.
//!
//! This module provides named caches of request/response snapshots using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Request identity keys (method + canonical URL) hashed with SHA-256
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Whole-cache deletion for version upgrades

pub mod caches;
pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use caches::CacheStats;
pub use connection::CacheDb;
pub use entries::{Cache, StoredResponse};
