//! Unified error types for momentum.
//!
//! Every variant renders with a stable code prefix so log lines and tool
//! errors can be matched without parsing free text.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types shared by the core, client and server crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., a blank task title).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// No record with the given id.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// No cache entry matched the request.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Writing a persisted record failed.
    #[error("STORAGE_ERROR: {0}")]
    Storage(String),

    /// A value could not be serialized for storage.
    #[error("STORAGE_ERROR: serialize failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Transport-level network failure (no response at all).
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// An asset manifest entry could not be fetched during install.
    #[error("INSTALL_FAILED: {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    /// A lifecycle hook was run from the wrong controller state.
    #[error("INVALID_STATE: cannot {action} while {state}")]
    InvalidState { action: &'static str, state: String },

    /// Network failed and the shell page is not cached either.
    #[error("OFFLINE: {0}")]
    Offline(String),
}

impl Error {
    /// Whether the network could not be reached at all.
    ///
    /// An oversized body is a response, not an outage, so it does not count.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_) | Error::FetchTimeout(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::NotFound(_) => -32000,
            Error::CacheMiss(_) => -32001,
            Error::Database(_) | Error::MigrationFailed(_) => -32002,
            Error::InvalidUrl(_) => -32003,
            Error::Storage(_) | Error::Serialize(_) => -32004,
            Error::Network(_) => -32005,
            Error::FetchTimeout(_) => -32006,
            Error::FetchTooLarge(_) => -32007,
            Error::InstallFailed { .. } => -32008,
            Error::InvalidState { .. } => -32009,
            Error::Offline(_) => -32010,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
