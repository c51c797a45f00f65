//! Host-side registration of cache controllers.
//!
//! Tracks the installing and active controllers and the open clients.
//! Registering runs the new controller's install and activate hooks, swaps
//! it in as the active controller and claims every open client. Only one
//! registration job runs at a time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, RwLock};

use super::controller::{CacheController, ResponseSource, Served};
use crate::fetch::{Fetcher, Request};
use momentum_core::{CacheDb, Error};

/// Identifies an open client (a page, in browser terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

pub struct Registration {
    db: CacheDb,
    network: Arc<dyn Fetcher>,
    jobs: Mutex<()>,
    installing: RwLock<Option<Arc<CacheController>>>,
    active: RwLock<Option<Arc<CacheController>>>,
    /// Open clients and whether each is controlled.
    clients: RwLock<HashMap<ClientId, bool>>,
    next_client: AtomicU64,
}

impl Registration {
    /// `network` serves clients that no controller controls.
    pub fn new(db: CacheDb, network: Arc<dyn Fetcher>) -> Self {
        Self {
            db,
            network,
            jobs: Mutex::new(()),
            installing: RwLock::new(None),
            active: RwLock::new(None),
            clients: RwLock::new(HashMap::new()),
            next_client: AtomicU64::new(1),
        }
    }

    /// Install and activate `controller`, then make it the active one.
    ///
    /// On failure the previously active controller keeps serving.
    pub async fn register(&self, controller: CacheController) -> Result<Arc<CacheController>, Error> {
        let _job = self.jobs.lock().await;
        let controller = Arc::new(controller);

        *self.installing.write().await = Some(controller.clone());
        let installed = controller.install().await;
        *self.installing.write().await = None;
        installed?;

        // Fetches wait for the purge and swap to finish.
        let mut active = self.active.write().await;
        let activated = controller.activate().await?;
        if let Some(previous) = active.replace(controller.clone()) {
            previous.mark_redundant();
        }
        drop(active);

        let claimed = self.claim().await;
        tracing::info!(
            version = %controller.version(),
            purged = activated.purged.len(),
            claimed,
            "controller activated"
        );
        Ok(controller)
    }

    /// Like [`register`](Self::register), but a failure only logs and the
    /// host carries on with plain network fetches. Returns whether the
    /// controller became active.
    pub async fn register_or_continue(&self, controller: CacheController) -> bool {
        let version = controller.version().to_string();
        match self.register(controller).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(version = %version, "registration failed, continuing without offline cache: {}", e);
                false
            }
        }
    }

    /// Put every open client under the active controller. Returns how many
    /// were newly claimed.
    async fn claim(&self) -> usize {
        let mut clients = self.clients.write().await;
        let mut claimed = 0;
        for controlled in clients.values_mut().filter(|c| !**c) {
            *controlled = true;
            claimed += 1;
        }
        claimed
    }

    /// Open a client. It is controlled right away only if a controller is active.
    pub async fn open_client(&self) -> ClientId {
        let id = ClientId(self.next_client.fetch_add(1, Ordering::Relaxed));
        let controlled = self.active.read().await.is_some();
        self.clients.write().await.insert(id, controlled);
        tracing::debug!(client = %id, controlled, "client opened");
        id
    }

    pub async fn close_client(&self, id: ClientId) -> bool {
        self.clients.write().await.remove(&id).is_some()
    }

    /// Version of the controller in charge of `id`, if any.
    pub async fn controller_of(&self, id: ClientId) -> Option<String> {
        let controlled = self.clients.read().await.get(&id).copied().unwrap_or(false);
        if !controlled {
            return None;
        }
        self.active_version().await
    }

    pub async fn active(&self) -> Option<Arc<CacheController>> {
        self.active.read().await.clone()
    }

    pub async fn active_version(&self) -> Option<String> {
        self.active.read().await.as_ref().map(|c| c.version().to_string())
    }

    pub async fn installing_version(&self) -> Option<String> {
        self.installing.read().await.as_ref().map(|c| c.version().to_string())
    }

    /// Route a client's request through its controller, or straight to the
    /// network when it has none.
    pub async fn fetch(&self, client: ClientId, request: &Request) -> Result<Served, Error> {
        let controlled = self
            .clients
            .read()
            .await
            .get(&client)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("{client}")))?;

        if controlled && let Some(active) = self.active().await {
            return active.handle_fetch(request).await;
        }

        let response = self.network.fetch(request).await?;
        Ok(Served { response, source: ResponseSource::Network })
    }

    /// Names of every cache in storage, oldest first.
    pub async fn cache_names(&self) -> Result<Vec<String>, Error> {
        self.db.cache_names().await
    }
}
