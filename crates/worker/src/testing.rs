//! Scripted network double shared by the router tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use birdie_core::{FetchError, Fetcher, WorkerRequest, WorkerResponse};
use http::{HeaderValue, StatusCode, header};

#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, (u16, String)>>,
    offline: AtomicBool,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` (with query) with `status` and `body`.
    pub fn route(&self, path: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(path.to_string(), (status, body.to_string()));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &WorkerRequest) -> Result<WorkerResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = match request.url.query() {
            Some(q) => format!("{}?{q}", request.path()),
            None => request.path().to_string(),
        };
        self.seen.lock().unwrap().push(format!("{} {key}", request.method));

        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Connect("connection refused".into()));
        }

        let routes = self.routes.lock().unwrap();
        let (status, body) = routes.get(&key).cloned().unwrap_or((404, "not found".into()));
        Ok(WorkerResponse::new(StatusCode::from_u16(status).unwrap())
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(body))
    }
}

pub fn get(path: &str) -> WorkerRequest {
    WorkerRequest::get(&format!("http://127.0.0.1:8080{path}")).unwrap()
}
