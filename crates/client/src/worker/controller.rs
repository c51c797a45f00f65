//! Offline cache controller.
//!
//! One controller owns one cache version. Its lifecycle runs
//! install -> activate, after which it answers fetches cache-first:
//!
//! 1. GET hit in the current cache is served without touching the network
//! 2. Otherwise the network is asked; OK GET responses are stored on the way out
//! 3. If the network is unreachable the cached shell page is served instead;
//!    any other fetch error goes back to the caller

use std::fmt;
use std::sync::Arc;

use futures_util::future::try_join_all;
use reqwest::{Method, Url};
use serde::Serialize;
use tokio::sync::watch;

use super::manifest::AssetManifest;
use super::state::WorkerState;
use crate::fetch::{FetchResponse, Fetcher, Request, resolve};
use momentum_core::{AppConfig, CacheDb, Error};

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    /// Current cache hit
    Cache,
    /// Fresh from the network
    Network,
    /// Network unreachable; the shell page was served
    Fallback,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSource::Cache => f.write_str("cache"),
            ResponseSource::Network => f.write_str("network"),
            ResponseSource::Fallback => f.write_str("fallback"),
        }
    }
}

/// A response handed back to a client.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: FetchResponse,
    pub source: ResponseSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Number of manifest entries stored.
    pub precached: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateOutcome {
    /// Stale caches deleted during activation.
    pub purged: Vec<String>,
}

/// Cache controller for a single version tag.
pub struct CacheController {
    version: String,
    scope: Url,
    manifest: AssetManifest,
    db: CacheDb,
    network: Arc<dyn Fetcher>,
    state: watch::Sender<WorkerState>,
}

impl fmt::Debug for CacheController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheController")
            .field("version", &self.version)
            .field("scope", &self.scope.as_str())
            .field("state", &self.state())
            .finish()
    }
}

impl CacheController {
    pub fn new(
        version: impl Into<String>, scope: Url, manifest: AssetManifest, db: CacheDb, network: Arc<dyn Fetcher>,
    ) -> Self {
        let (state, _) = watch::channel(WorkerState::Parsed);
        Self { version: version.into(), scope, manifest, db, network, state }
    }

    pub fn from_config(config: &AppConfig, db: CacheDb, network: Arc<dyn Fetcher>) -> Result<Self, Error> {
        let scope = Url::parse(&config.scope).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.scope)))?;
        let manifest = AssetManifest::from_config(config)?;
        Ok(Self::new(config.cache_version.clone(), scope, manifest, db, network))
    }

    /// The version tag, which is also the name of this controller's cache.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    pub fn mark_redundant(&self) {
        let previous = self.state.send_replace(WorkerState::Redundant);
        if previous != WorkerState::Redundant {
            tracing::info!(version = %self.version, from = %previous, "controller redundant");
        }
    }

    fn transition(&self, action: &'static str, from: WorkerState, to: WorkerState) -> Result<(), Error> {
        let mut current = from;
        let moved = self.state.send_if_modified(|state| {
            if *state != from {
                current = *state;
                return false;
            }
            *state = to;
            true
        });

        if !moved {
            return Err(Error::InvalidState { action, state: current.to_string() });
        }
        tracing::info!(version = %self.version, from = %from, to = %to, "controller state");
        Ok(())
    }

    /// Precache every manifest asset.
    ///
    /// All assets are fetched before anything is written, and every one
    /// must come back with an OK status. Any failure leaves the controller
    /// redundant.
    pub async fn install(&self) -> Result<InstallOutcome, Error> {
        self.transition("install", WorkerState::Parsed, WorkerState::Installing)?;

        match self.precache().await {
            Ok(precached) => {
                self.transition("install", WorkerState::Installing, WorkerState::Installed)?;
                Ok(InstallOutcome { precached })
            }
            Err(e) => {
                tracing::warn!(version = %self.version, "install failed: {}", e);
                self.mark_redundant();
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, Error> {
        let urls = self.manifest.resolve(&self.scope)?;

        let fetches = urls.into_iter().map(|url| async move {
            let request = Request::get(url);
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| Error::InstallFailed { url: request.url.to_string(), reason: e.to_string() })?;
            if !response.is_ok() {
                return Err(Error::InstallFailed {
                    url: request.url.to_string(),
                    reason: format!("status {}", response.status.as_u16()),
                });
            }
            Ok(response.to_stored(&request))
        });
        let responses = try_join_all(fetches).await?;
        let precached = responses.len();

        let cache = self.db.open_cache(&self.version).await?;
        cache.put_all(responses).await?;

        tracing::info!(version = %self.version, precached, "assets precached");
        Ok(precached)
    }

    /// Delete every cache that is not this version's.
    pub async fn activate(&self) -> Result<ActivateOutcome, Error> {
        self.transition("activate", WorkerState::Installed, WorkerState::Activating)?;

        match self.purge_stale().await {
            Ok(purged) => {
                self.transition("activate", WorkerState::Activating, WorkerState::Activated)?;
                Ok(ActivateOutcome { purged })
            }
            Err(e) => {
                tracing::warn!(version = %self.version, "activate failed: {}", e);
                self.mark_redundant();
                Err(e)
            }
        }
    }

    async fn purge_stale(&self) -> Result<Vec<String>, Error> {
        let stale: Vec<String> = self
            .db
            .cache_names()
            .await?
            .into_iter()
            .filter(|name| *name != self.version)
            .collect();

        let deletions = stale.iter().map(|name| self.db.delete_cache(name));
        try_join_all(deletions).await?;

        for name in &stale {
            tracing::info!(version = %self.version, cache = %name, "purged stale cache");
        }
        Ok(stale)
    }

    /// Answer a fetch from a controlled client.
    pub async fn handle_fetch(&self, request: &Request) -> Result<Served, Error> {
        let state = self.state();
        if state != WorkerState::Activated {
            return Err(Error::InvalidState { action: "handle fetch", state: state.to_string() });
        }

        let mut request = request.clone();
        request.url = resolve(&self.scope, request.url.as_str())?;
        let cache = self.db.cache(&self.version);

        if request.is_get()
            && let Some(stored) = cache.match_request(request.method.as_str(), request.url.as_str()).await?
        {
            tracing::debug!("cache hit: {}", request.url);
            return Ok(Served { response: FetchResponse::from_stored(&stored)?, source: ResponseSource::Cache });
        }

        match self.network.fetch(&request).await {
            Ok(response) => {
                if request.is_get() && response.is_ok() {
                    cache.put(&response.to_stored(&request)).await?;
                    tracing::debug!("cached: {}", request.url);
                }
                Ok(Served { response, source: ResponseSource::Network })
            }
            Err(e) if e.is_network() => self.serve_shell(&request, e).await,
            Err(e) => Err(e),
        }
    }

    async fn serve_shell(&self, request: &Request, cause: Error) -> Result<Served, Error> {
        let shell = self.manifest.shell_url(&self.scope)?;
        let stored = self
            .db
            .cache(&self.version)
            .match_request(Method::GET.as_str(), shell.as_str())
            .await?;

        match stored {
            Some(stored) => {
                tracing::warn!("network failed for {}, serving shell: {}", request.url, cause);
                Ok(Served { response: FetchResponse::from_stored(&stored)?, source: ResponseSource::Fallback })
            }
            None => Err(Error::Offline(format!("{} ({cause}); shell page {shell} not cached", request.url))),
        }
    }
}
