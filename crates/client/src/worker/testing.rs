//! In-memory network for controller tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use reqwest::StatusCode;

use crate::fetch::{FetchResponse, Fetcher, Request};
use momentum_core::Error;

/// Serves canned responses by URL; unknown URLs get a 404.
#[derive(Default)]
pub struct StubFetcher {
    routes: Mutex<HashMap<String, (u16, String)>>,
    oversized: Mutex<HashSet<String>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, status: u16, body: &str) -> Self {
        self.set_route(url, status, body);
        self
    }

    pub fn set_route(&self, url: &str, status: u16, body: &str) {
        let mut routes = self.routes.lock().unwrap();
        routes.insert(url.to_string(), (status, body.to_string()));
    }

    /// Answer `url` with a body over the size limit.
    pub fn set_oversized(&self, url: &str) {
        self.oversized.lock().unwrap().insert(url.to_string());
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("{}: connection refused", request.url)));
        }

        if self.oversized.lock().unwrap().contains(request.url.as_str()) {
            return Err(Error::FetchTooLarge(format!("{}: 6291456 bytes exceeds 5242880", request.url)));
        }

        let route = self.routes.lock().unwrap().get(request.url.as_str()).cloned();
        let (status, body) = route.unwrap_or((404, "not found".to_string()));
        let status = StatusCode::from_u16(status).unwrap();
        Ok(FetchResponse::new(request.url.clone(), status, body))
    }
}
