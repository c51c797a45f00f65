//! cache_status tool implementation.

use momentum_client::{Registration, WorkerState};
use momentum_core::CacheDb;
use momentum_core::cache::CacheStats;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;

use crate::tools::json_result;

/// Output from the cache_status tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CacheStatusOutput {
    /// Whether a controller is registered at startup.
    pub offline_enabled: bool,
    /// Version tag of the active controller, if any.
    pub active_version: Option<String>,
    pub active_state: Option<WorkerState>,
    /// Version currently installing, if a registration is in flight.
    pub installing_version: Option<String>,
    /// Every cache in storage, oldest first.
    pub caches: Vec<CacheStats>,
}

/// Implementation of the cache_status tool.
pub async fn status_impl(
    registration: &Registration, db: &CacheDb, offline_enabled: bool,
) -> Result<CallToolResult, McpError> {
    let active = registration.active().await;
    let output = CacheStatusOutput {
        offline_enabled,
        active_version: active.as_ref().map(|c| c.version().to_string()),
        active_state: active.as_ref().map(|c| c.state()),
        installing_version: registration.installing_version().await,
        caches: db.cache_stats().await?,
    };

    json_result(&output)
}
