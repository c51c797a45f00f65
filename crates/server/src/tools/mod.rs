//! MCP tool implementations.
//!
//! This module contains all tools exposed by the momentum server.

pub mod cache;
pub mod habits;
pub mod notes;
pub mod tasks;
pub mod timer;
pub mod today;

#[cfg(test)]
pub(crate) mod testing;

use momentum_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Pretty-printed JSON tool output.
pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
