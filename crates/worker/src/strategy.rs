//! Cache strategies.
//!
//! ### Static assets (cache-first)
//! - A stored copy is served without touching the network
//! - A miss is fetched; a full 2xx answer is copied into the static store
//! - Offline navigations fall back to the stored root document
//!
//! ### API reads (network-first)
//! - The network answer always wins when there is one, 2xx or not
//! - Only a transport failure falls back to the API store
//!
//! Store failures never fail a request: a read error is a miss and a write
//! error is only logged.

use std::time::Duration;

use birdie_core::{CacheStore, Fetcher, WorkerRequest, WorkerResponse};
use chrono::{DateTime, Utc};

use crate::offline;

async fn lookup(store: &CacheStore, request: &WorkerRequest) -> Option<(WorkerResponse, DateTime<Utc>)> {
    match store.match_request(request).await {
        Ok(Some(entry)) => {
            let stored_at = entry.stored_at;
            match entry.into_response() {
                Ok(response) => Some((response, stored_at)),
                Err(e) => {
                    tracing::warn!(store = store.name(), url = %request.url, "unreadable cache entry: {}", e);
                    None
                }
            }
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(store = store.name(), url = %request.url, "cache read failed: {}", e);
            None
        }
    }
}

async fn store_copy(store: &CacheStore, request: &WorkerRequest, response: &WorkerResponse) {
    if let Err(e) = store.put(request, response).await {
        tracing::warn!(store = store.name(), url = %request.url, "cache write failed: {}", e);
    }
}

/// Cache-first handling of static assets.
#[derive(Debug, Clone)]
pub struct StaticStrategy {
    store: CacheStore,
    root_document: String,
}

impl StaticStrategy {
    pub fn new(store: CacheStore, root_document: impl Into<String>) -> Self {
        Self { store, root_document: root_document.into() }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub async fn handle(&self, fetcher: &dyn Fetcher, request: &WorkerRequest) -> WorkerResponse {
        if let Some((response, _)) = lookup(&self.store, request).await {
            tracing::trace!(url = %request.url, "static cache hit");
            return response;
        }

        match fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    store_copy(&self.store, request, &response).await;
                }
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, "static fetch failed: {}", e);
                if request.is_navigation() {
                    if let Some(root) = self.root_fallback(request).await {
                        return root;
                    }
                }
                offline::offline()
            }
        }
    }

    async fn root_fallback(&self, request: &WorkerRequest) -> Option<WorkerResponse> {
        let root = match request.sibling(&self.root_document) {
            Ok(root) => root,
            Err(e) => {
                tracing::warn!("invalid root document {}: {}", self.root_document, e);
                return None;
            }
        };
        lookup(&self.store, &root).await.map(|(response, _)| response)
    }
}

/// Network-first handling of API requests.
#[derive(Debug, Clone)]
pub struct ApiStrategy {
    store: CacheStore,
    max_age: Option<Duration>,
}

impl ApiStrategy {
    pub fn new(store: CacheStore, max_age: Option<Duration>) -> Self {
        Self { store, max_age }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Read endpoints: network, then the API store.
    pub async fn handle_cacheable(&self, fetcher: &dyn Fetcher, request: &WorkerRequest) -> WorkerResponse {
        match fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    store_copy(&self.store, request, &response).await;
                }
                response
            }
            Err(e) => {
                tracing::debug!(url = %request.url, "API fetch failed, trying cache: {}", e);
                match self.fallback(request, Utc::now()).await {
                    Some(response) => response,
                    None => offline::data_unavailable_offline(),
                }
            }
        }
    }

    /// Everything else under the API prefix: network only.
    pub async fn handle_network_only(&self, fetcher: &dyn Fetcher, request: &WorkerRequest) -> WorkerResponse {
        match fetcher.fetch(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(method = %request.method, url = %request.url, "API fetch failed: {}", e);
                offline::network_unavailable()
            }
        }
    }

    pub(crate) async fn fallback(&self, request: &WorkerRequest, now: DateTime<Utc>) -> Option<WorkerResponse> {
        let (response, stored_at) = lookup(&self.store, request).await?;
        let too_old = self
            .max_age
            .is_some_and(|max_age| (now - stored_at).to_std().is_ok_and(|age| age > max_age));
        if too_old {
            tracing::debug!(url = %request.url, "cached API entry too old");
            return None;
        }
        Some(response)
    }
}
