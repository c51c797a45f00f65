//! cache_update tool implementation.
//!
//! Registers a fresh controller for the configured version: the manifest is
//! fetched again, and on success stale caches are purged and open clients
//! are claimed.

use std::sync::Arc;

use momentum_client::{CacheController, Fetcher, Registration, WorkerState};
use momentum_core::{AppConfig, CacheDb};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;

use crate::tools::json_result;

/// Output from the cache_update tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CacheUpdateOutput {
    pub version: String,
    pub state: WorkerState,
    /// Caches left after activation.
    pub caches: Vec<String>,
}

/// Implementation of the cache_update tool.
pub async fn update_impl(
    registration: &Registration, config: &AppConfig, db: &CacheDb, network: Arc<dyn Fetcher>,
) -> Result<CallToolResult, McpError> {
    let controller = CacheController::from_config(config, db.clone(), network)?;
    let active = registration.register(controller).await?;

    let output = CacheUpdateOutput {
        version: active.version().to_string(),
        state: active.state(),
        caches: registration.cache_names().await?,
    };

    json_result(&output)
}
