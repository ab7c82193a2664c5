//! HTTP fetch pipeline used as the router's network.
//!
//! ### Forwarding
//! - The public URL is rewritten to its upstream (see [`upstream`])
//! - Method, body and end-to-end headers are forwarded
//! - Hop-by-hop headers are dropped in both directions
//! - Redirects are not followed; a 3xx goes back to the client as is
//!
//! ### Failure model
//! - Any HTTP status, 2xx or not, is a normal response
//! - Connect errors, timeouts and body read errors are [`FetchError`]s

pub mod upstream;

use std::time::{Duration, Instant};

use birdie_core::{AppConfig, Error, FetchError, Fetcher, WorkerRequest, WorkerResponse};
use http::{HeaderMap, HeaderName, header};
use reqwest::Client;

pub use upstream::{RewriteRule, Upstreams};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "birdie/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects the API client follows (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "birdie/0.1".to_string(), timeout: Duration::from_millis(20000), max_redirects: 5 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Headers forwarded upstream.
///
/// `host` is set by reqwest for the upstream; `accept-encoding` is left to
/// reqwest so it can decompress what it negotiated.
fn forwardable_request_headers(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name) && **name != header::HOST && **name != header::ACCEPT_ENCODING)
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn forwardable_response_headers(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(err.to_string())
    } else if err.is_builder() {
        FetchError::InvalidRequest(err.to_string())
    } else {
        FetchError::Connect(err.to_string())
    }
}

/// reqwest-backed [`Fetcher`] forwarding to the configured upstreams.
pub struct HttpFetcher {
    http: Client,
    upstreams: Upstreams,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration and routing table.
    pub fn new(config: FetchConfig, upstreams: Upstreams) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, upstreams, config })
    }

    pub fn upstreams(&self) -> &Upstreams {
        &self.upstreams
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &WorkerRequest) -> Result<WorkerResponse, FetchError> {
        let start = Instant::now();
        let target = self
            .upstreams
            .resolve(&request.url)
            .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;

        let mut builder = self
            .http
            .request(request.method.clone(), target.as_str())
            .headers(forwardable_request_headers(&request.headers));
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let headers = forwardable_response_headers(response.headers());
        let body = response.bytes().await.map_err(|e| FetchError::Body(e.to_string()))?;

        tracing::debug!(
            "fetched {} {} -> {} {} in {}ms ({} bytes)",
            request.method,
            request.url,
            target,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(WorkerResponse { status, headers, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "birdie/0.1");
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { user_agent: "club/2".into(), timeout_ms: 1500, ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "club/2");
        assert_eq!(config.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_request_headers_filtered() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("127.0.0.1:8080"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=abc"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let forwarded = forwardable_request_headers(&headers);
        assert_eq!(forwarded.len(), 2);
        assert!(forwarded.contains_key(header::COOKIE));
        assert!(forwarded.contains_key(header::CONTENT_TYPE));
    }

    #[test]
    fn test_response_headers_filtered() {
        let mut headers = HeaderMap::new();
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(HeaderName::from_static("keep-alive"), HeaderValue::from_static("timeout=5"));
        headers.insert(header::SET_COOKIE, HeaderValue::from_static("session=abc"));

        let forwarded = forwardable_response_headers(&headers);
        assert_eq!(forwarded.len(), 1);
        assert!(forwarded.contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn test_http_fetcher_new() {
        let upstreams = Upstreams::from_config(&AppConfig::default()).unwrap();
        let fetcher = HttpFetcher::new(FetchConfig::default(), upstreams);
        assert!(fetcher.is_ok());
    }

    #[tokio::test]
    async fn test_redirect_returned_to_client() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 302 Found\r\nLocation: /login\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
        });

        let config = AppConfig { static_origin: format!("http://{addr}"), ..Default::default() };
        let fetcher = HttpFetcher::new(FetchConfig::default(), Upstreams::from_config(&config).unwrap()).unwrap();

        let response = fetcher.fetch(&WorkerRequest::get("http://127.0.0.1:8080/profile").unwrap()).await.unwrap();
        assert_eq!(response.status, http::StatusCode::FOUND);
        assert_eq!(response.headers.get(header::LOCATION).unwrap(), "/login");
    }

    #[tokio::test]
    async fn test_connect_failure_is_fetch_error() {
        let config = AppConfig {
            static_origin: "http://127.0.0.1:9".into(),
            api_upstream: "http://127.0.0.1:9".into(),
            ..Default::default()
        };
        let fetcher = HttpFetcher::new(
            FetchConfig { timeout: Duration::from_millis(500), ..Default::default() },
            Upstreams::from_config(&config).unwrap(),
        )
        .unwrap();

        let request = WorkerRequest::get("http://127.0.0.1:8080/api/matches").unwrap();
        let result = fetcher.fetch(&request).await;
        assert!(matches!(result, Err(FetchError::Connect(_)) | Err(FetchError::Timeout(_))));
    }
}
