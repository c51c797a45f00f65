//! asset_fetch tool implementation.
//!
//! Fetches an app asset the way the app's own page would: through the
//! active cache controller when there is one, straight from the network
//! otherwise.

use momentum_client::{ClientId, Method, Registration, Request, ResponseSource, resolve};
use momentum_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::tools::json_result;

/// Parameters for the asset_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetFetchParams {
    /// Asset path relative to the app scope (e.g. "./app.js") or an absolute URL.
    pub path: String,

    /// HTTP method (default: GET). Only GET responses are cached.
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the asset_fetch tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AssetFetchOutput {
    /// Canonical request URL.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    /// cache, network or fallback.
    pub source: ResponseSource,
    /// Body length in bytes.
    pub bytes: usize,
    /// Body as text, when it is valid UTF-8.
    pub body: Option<String>,
    /// Network time in milliseconds (0 when served from cache).
    pub fetch_ms: u64,
}

/// Implementation of the asset_fetch tool.
pub async fn fetch_impl(
    registration: &Registration, client: ClientId, scope: &Url, params: AssetFetchParams,
) -> Result<CallToolResult, McpError> {
    let method = Method::from_bytes(params.method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|e| Error::InvalidInput(format!("unsupported method {}: {e}", params.method)))?;
    let url = resolve(scope, &params.path).map_err(Error::from)?;

    let served = registration.fetch(client, &Request::new(method, url)).await?;
    tracing::debug!(url = %served.response.url, source = %served.source, "asset fetched");

    let response = served.response;
    let output = AssetFetchOutput {
        url: response.url.to_string(),
        status: response.status.as_u16(),
        content_type: response.content_type().map(str::to_string),
        source: served.source,
        bytes: response.body.len(),
        body: std::str::from_utf8(&response.body).ok().map(str::to_string),
        fetch_ms: response.fetch_ms,
    };

    json_result(&output)
}
