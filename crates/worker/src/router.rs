//! The offline cache router.
//!
//! One [`Router`] owns both named stores and the lifecycle state. Hosts feed
//! it events (`install`, `activate`, `fetch`, `sync`, `push`, notification
//! click) and act on what it returns.

use std::sync::Arc;
use std::time::Duration;

use birdie_core::{AppConfig, CacheStorage, Error, Fetcher, NotificationConfig, WorkerRequest, WorkerResponse};
use chrono::Utc;
use tokio::sync::RwLock;
use url::Url;

use crate::classify::{Classification, Classifier};
use crate::lifecycle::LifecycleState;
use crate::notify::{NotificationClick, NotificationRequest};
use crate::strategy::{ApiStrategy, StaticStrategy};
use crate::sync::{ReplayHook, SyncOutcome};

/// Everything the router needs from the application configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Origin manifest paths are resolved against.
    pub origin: Url,
    pub static_cache_name: String,
    pub api_cache_name: String,
    pub api_prefix: String,
    pub api_cache_patterns: Vec<String>,
    pub static_manifest: Vec<String>,
    pub root_document: String,
    pub sync_tag: String,
    pub api_fallback_max_age: Option<Duration>,
    pub notification: NotificationConfig,
}

impl RouterConfig {
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.public_origin)
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.public_origin)))?;

        Ok(Self {
            origin,
            static_cache_name: config.static_cache_name(),
            api_cache_name: config.api_cache_name(),
            api_prefix: config.api_prefix.clone(),
            api_cache_patterns: config.api_cache_patterns.clone(),
            static_manifest: config.static_manifest.clone(),
            root_document: config.root_document.clone(),
            sync_tag: config.sync_tag.clone(),
            api_fallback_max_age: config.api_fallback_max_age(),
            notification: config.notification.clone(),
        })
    }

    fn manifest_requests(&self) -> Result<Vec<WorkerRequest>, Error> {
        self.static_manifest
            .iter()
            .map(|path| {
                let url = self.origin.join(path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))?;
                WorkerRequest::get(url.as_str())
            })
            .collect()
    }
}

/// What the host should do with an intercepted request.
#[derive(Debug)]
pub enum FetchOutcome {
    Respond(WorkerResponse),
    /// Not handled; the host performs a plain network fetch.
    Passthrough,
}

pub struct Router {
    config: RouterConfig,
    storage: CacheStorage,
    fetcher: Arc<dyn Fetcher>,
    replay: Arc<dyn ReplayHook>,
    classifier: Classifier,
    static_strategy: StaticStrategy,
    api_strategy: ApiStrategy,
    state: RwLock<LifecycleState>,
}

impl Router {
    pub fn new(
        config: RouterConfig, storage: CacheStorage, fetcher: Arc<dyn Fetcher>, replay: Arc<dyn ReplayHook>,
    ) -> Self {
        let classifier = Classifier::new(config.api_prefix.clone(), config.api_cache_patterns.clone());
        let static_strategy =
            StaticStrategy::new(storage.open_store(config.static_cache_name.clone()), config.root_document.clone());
        let api_strategy = ApiStrategy::new(storage.open_store(config.api_cache_name.clone()), config.api_fallback_max_age);

        Self {
            config,
            storage,
            fetcher,
            replay,
            classifier,
            static_strategy,
            api_strategy,
            state: RwLock::new(LifecycleState::Installing),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Pre-cache the static manifest.
    ///
    /// Returns whether every manifest entry was stored. A failed pre-cache is
    /// logged and the router still moves on to `WaitingToActivate`.
    pub async fn on_install(&self) -> bool {
        *self.state.write().await = LifecycleState::Installing;

        let result = match self.config.manifest_requests() {
            Ok(requests) => self.static_strategy.store().add_all(self.fetcher.as_ref(), &requests).await,
            Err(e) => Err(e),
        };

        let precached = match result {
            Ok(()) => {
                tracing::info!(
                    store = %self.config.static_cache_name,
                    entries = self.config.static_manifest.len(),
                    "static assets pre-cached"
                );
                true
            }
            Err(e) => {
                tracing::error!(store = %self.config.static_cache_name, "pre-cache failed: {}", e);
                false
            }
        };

        *self.state.write().await = LifecycleState::WaitingToActivate;
        precached
    }

    /// Delete every store that is not current and start intercepting.
    ///
    /// Returns the names of the deleted stores.
    pub async fn on_activate(&self) -> Result<Vec<String>, Error> {
        let mut state = self.state.write().await;
        if !state.can_activate() {
            return Err(Error::Lifecycle(format!("cannot activate while {}", *state)));
        }

        let names = self.storage.keys().await?;
        let mut deleted = Vec::new();
        for name in names {
            if name == self.config.static_cache_name || name == self.config.api_cache_name {
                continue;
            }
            match self.storage.delete(&name).await {
                Ok(_) => {
                    tracing::info!(store = %name, "deleted old cache store");
                    deleted.push(name);
                }
                Err(e) => tracing::warn!(store = %name, "failed to delete old cache store: {}", e),
            }
        }

        *state = LifecycleState::Active;
        Ok(deleted)
    }

    /// Route one intercepted request.
    pub async fn on_fetch(&self, request: &WorkerRequest) -> FetchOutcome {
        if *self.state.read().await != LifecycleState::Active {
            return FetchOutcome::Passthrough;
        }

        let fetcher = self.fetcher.as_ref();
        let response = match self.classifier.classify(&request.method, request.path()) {
            Classification::Static => self.static_strategy.handle(fetcher, request).await,
            Classification::CacheableApi => self.api_strategy.handle_cacheable(fetcher, request).await,
            Classification::NonCacheableApi => self.api_strategy.handle_network_only(fetcher, request).await,
            Classification::Passthrough => return FetchOutcome::Passthrough,
        };
        FetchOutcome::Respond(response)
    }

    /// Handle a background sync event.
    pub async fn on_sync(&self, tag: &str) -> Result<SyncOutcome, Error> {
        if tag != self.config.sync_tag {
            tracing::debug!(tag, "ignoring sync tag");
            return Ok(SyncOutcome::Ignored);
        }

        self.replay.replay().await.map_err(|e| match e {
            Error::Replay(_) => e,
            other => Error::Replay(other.to_string()),
        })?;
        Ok(SyncOutcome::Replayed)
    }

    pub fn on_push(&self, payload: Option<&str>) -> NotificationRequest {
        NotificationRequest::from_push(&self.config.notification, payload, Utc::now())
    }

    pub fn on_notification_click(&self, action: Option<&str>) -> NotificationClick {
        NotificationClick::from_action(&self.config.notification, action)
    }
}
