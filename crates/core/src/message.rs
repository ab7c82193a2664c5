//! Request and response values exchanged between the host, the router and
//! the network.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;
use crate::url::canonicalize;

/// Content type of synthesized JSON responses.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Content type of synthesized plain-text responses.
pub const TEXT_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";

/// How the request was initiated by the client shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// A full-page navigation.
    Navigate,
    /// Any subresource or programmatic request.
    #[default]
    Other,
}

/// An intercepted outgoing request.
#[derive(Debug, Clone)]
pub struct WorkerRequest {
    pub method: Method,
    /// Canonical absolute URL (fragment stripped, query kept).
    pub url: Url,
    pub headers: HeaderMap,
    pub mode: RequestMode,
    pub body: Bytes,
}

impl WorkerRequest {
    /// Build a request for an absolute URL.
    pub fn new(method: Method, url: &str) -> Result<Self, Error> {
        let url = canonicalize(url)?;
        Ok(Self { method, url, headers: HeaderMap::new(), mode: RequestMode::Other, body: Bytes::new() })
    }

    /// Shorthand for a GET request.
    pub fn get(url: &str) -> Result<Self, Error> {
        Self::new(Method::GET, url)
    }

    /// Mark the request as a full-page navigation.
    pub fn navigate(mut self) -> Self {
        self.mode = RequestMode::Navigate;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// URL path, without query string.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// A GET request for `path` on the same origin as this request.
    pub fn sibling(&self, path: &str) -> Result<Self, Error> {
        let url = self.url.join(path).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Self::get(url.as_str())
    }
}

/// A response produced by the network, a cache store, or the router itself.
#[derive(Debug, Clone)]
pub struct WorkerResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl WorkerResponse {
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), body: Bytes::new() }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// JSON error object `{"error": <message>}`, serialized compactly.
    pub fn json_error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::new(status)
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .with_body(body)
    }

    /// Plain-text response.
    pub fn text(status: StatusCode, text: &'static str) -> Self {
        Self::new(status)
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE))
            .with_body(Bytes::from_static(text.as_bytes()))
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Whether a copy may be stored: any 2xx except a partial body.
    pub fn is_cacheable(&self) -> bool {
        self.is_success() && self.status != StatusCode::PARTIAL_CONTENT
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}
