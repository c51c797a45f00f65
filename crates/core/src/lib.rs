//! Core types and shared functionality for momentum.
//!
//! This crate provides:
//! - Versioned response cache storage with SQLite backend
//! - The local record store and its backends
//! - Feature modules (tasks, habits, focus timer, notes)
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod features;
pub mod store;

pub use cache::{Cache, CacheDb, StoredResponse};
pub use config::AppConfig;
pub use error::Error;
pub use store::{KeyValueStore, LocalStore, MemoryStorage, SqliteStorage};
