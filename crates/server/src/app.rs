//! Shared state and the axum application.

use std::sync::Arc;

use axum::Router as HttpRouter;
use axum::extract::DefaultBodyLimit;
use birdie_client::{FetchConfig, HttpFetcher, Upstreams};
use birdie_core::{AppConfig, CacheStorage, Fetcher};
use birdie_worker::{NoopReplay, Router, RouterConfig};

use crate::{control, proxy};

/// Prefix of the host control endpoints; never forwarded to the router.
pub const CONTROL_PREFIX: &str = "/__birdie";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub router: Arc<Router>,
    /// Used directly for requests the router passes through.
    pub fetcher: Arc<dyn Fetcher>,
}

impl AppState {
    pub fn new(config: AppConfig, router: Router, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { config: Arc::new(config), router: Arc::new(router), fetcher }
    }

    /// Open the cache database and wire the router to the real network.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let storage = CacheStorage::open(&config.db_path).await?;
        let fetcher: Arc<dyn Fetcher> =
            Arc::new(HttpFetcher::new(FetchConfig::from(&config), Upstreams::from_config(&config)?)?);
        let router = Router::new(RouterConfig::from_config(&config)?, storage, fetcher.clone(), Arc::new(NoopReplay));
        Ok(Self::new(config, router, fetcher))
    }
}

/// Control routes under [`CONTROL_PREFIX`], everything else proxied.
///
/// Proxied bodies are forwarded whatever their size; the upstream decides
/// what it accepts.
pub fn build_app(state: AppState) -> HttpRouter {
    HttpRouter::new()
        .nest(CONTROL_PREFIX, control::routes())
        .fallback(proxy::handle)
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use birdie_core::{FetchError, WorkerRequest, WorkerResponse};
    use http::{Request, StatusCode};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tower::ServiceExt;

    /// Answers every path with its own name until switched offline.
    #[derive(Default)]
    struct EchoFetcher {
        offline: AtomicBool,
        last_body_len: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Fetcher for EchoFetcher {
        async fn fetch(&self, request: &WorkerRequest) -> Result<WorkerResponse, FetchError> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(FetchError::Connect("connection refused".into()));
            }
            self.last_body_len.store(request.body.len(), Ordering::SeqCst);
            Ok(WorkerResponse::new(StatusCode::OK).with_body(format!("{} {}", request.method, request.path())))
        }
    }

    async fn state(fetcher: Arc<EchoFetcher>) -> AppState {
        let config = AppConfig::default();
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let router = Router::new(RouterConfig::from_config(&config).unwrap(), storage, fetcher.clone(), Arc::new(NoopReplay));
        AppState::new(config, router, fetcher)
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, String) {
        let response = build_app(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri).body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_lifecycle_endpoints() {
        let state = state(Arc::new(EchoFetcher::default())).await;

        let (status, body) = send(&state, get("/__birdie/state")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"state":"installing"}"#);

        let (status, _) = send(&state, post("/__birdie/activate", "")).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = send(&state, post("/__birdie/install", "")).await;
        assert_eq!(body, r#"{"precached":true,"state":"waiting_to_activate"}"#);

        let (status, body) = send(&state, post("/__birdie/activate", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"deleted":[],"state":"active"}"#);

        let (_, body) = send(&state, get("/__birdie/caches")).await;
        assert_eq!(body, r#"[{"name":"badminton-app-v1.0.0","entries":6}]"#);
    }

    #[tokio::test]
    async fn test_inactive_router_passes_through() {
        let state = state(Arc::new(EchoFetcher::default())).await;
        let (status, body) = send(&state, get("/static/js/bundle.js")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "GET /static/js/bundle.js");
    }

    #[tokio::test]
    async fn test_offline_proxy_responses() {
        let fetcher = Arc::new(EchoFetcher::default());
        let state = state(fetcher.clone()).await;
        state.router.on_install().await;
        state.router.on_activate().await.unwrap();

        let (_, body) = send(&state, get("/api/matches")).await;
        assert_eq!(body, "GET /api/matches");

        fetcher.offline.store(true, Ordering::SeqCst);

        let (status, body) = send(&state, get("/api/matches")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "GET /api/matches");

        let (status, body) = send(&state, post("/api/matches", "{}")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, r#"{"error":"Network unavailable"}"#);

        let navigation = Request::get("/matches/4").header("sec-fetch-mode", "navigate").body(Body::empty()).unwrap();
        let (status, body) = send(&state, navigation).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "GET /");

        let (status, body) = send(&state, post("/upload", "x")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, "Bad Gateway");
    }

    #[tokio::test]
    async fn test_large_mutation_reaches_network() {
        let fetcher = Arc::new(EchoFetcher::default());
        let state = state(fetcher.clone()).await;
        state.router.on_install().await;
        state.router.on_activate().await.unwrap();

        let payload = vec![b'x'; 3 * 1024 * 1024];
        let request = Request::post("/api/posts/1/attachments").body(Body::from(payload)).unwrap();
        let (status, body) = send(&state, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "POST /api/posts/1/attachments");
        assert_eq!(fetcher.last_body_len.load(Ordering::SeqCst), 3 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_sync_push_and_click() {
        let state = state(Arc::new(EchoFetcher::default())).await;

        let (_, body) = send(&state, post("/__birdie/sync/background-sync-matches", "")).await;
        assert_eq!(body, r#"{"tag":"background-sync-matches","outcome":"replayed"}"#);
        let (_, body) = send(&state, post("/__birdie/sync/other", "")).await;
        assert_eq!(body, r#"{"tag":"other","outcome":"ignored"}"#);

        let (_, body) = send(&state, post("/__birdie/push", "Match verified")).await;
        let notification: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(notification["title"], "Badminton App");
        assert_eq!(notification["body"], "Match verified");

        let (_, body) = send(&state, post("/__birdie/push", "")).await;
        let notification: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(notification["body"], "New badminton activity!");

        let click = Request::post("/__birdie/notification-click")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"action":"explore"}"#))
            .unwrap();
        let (_, body) = send(&state, click).await;
        assert_eq!(body, r#"{"close":true,"open_url":"/"}"#);
    }
}
