//! Network double for tool tests.

use std::sync::atomic::{AtomicBool, Ordering};

use momentum_client::fetch::StatusCode;
use momentum_client::{FetchResponse, Fetcher, Request};
use momentum_core::Error;
use rmcp::model::CallToolResult;

/// Answers every URL with the same small page.
pub struct OneFileServer {
    offline: AtomicBool,
}

impl OneFileServer {
    pub fn online() -> Self {
        Self { offline: AtomicBool::new(false) }
    }

    pub fn offline() -> Self {
        Self { offline: AtomicBool::new(true) }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Fetcher for OneFileServer {
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, Error> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("{}: unreachable", request.url)));
        }
        Ok(FetchResponse::new(request.url.clone(), StatusCode::OK, "<html>momentum</html>"))
    }
}

/// Parse the JSON text of a tool result.
pub fn output_json(result: &CallToolResult) -> serde_json::Value {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
