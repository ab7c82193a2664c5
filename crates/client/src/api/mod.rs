//! REST client for the club API.
//!
//! Every call goes through [`ApiClient::request`]: the session cookie jar is
//! always attached, JSON bodies are sent as `application/json`, multipart
//! bodies keep the boundary content type reqwest generates, and any non-2xx
//! status is an error.
//!
//! Attachments are registered by metadata: the backend takes a JSON body at
//! `/posts/{id}/attachments`, not an upload.

pub mod types;

use birdie_core::Error;
use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::fetch::FetchConfig;
pub use types::*;

/// Body of an API call.
#[derive(Debug)]
pub enum RequestBody {
    Json(serde_json::Value),
    Form(Form),
}

/// Per-call options, mirroring the fetch init object of the web client.
#[derive(Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { method: Method::GET, headers: HeaderMap::new(), body: None }
    }
}

impl RequestOptions {
    pub fn method(method: Method) -> Self {
        Self { method, ..Default::default() }
    }

    /// Options carrying a JSON body.
    pub fn json(method: Method, body: &impl Serialize) -> Result<Self, Error> {
        let value = serde_json::to_value(body).map_err(|e| Error::InvalidInput(e.to_string()))?;
        Ok(Self { method, headers: HeaderMap::new(), body: Some(RequestBody::Json(value)) })
    }

    pub fn form(method: Method, form: Form) -> Self {
        Self { method, headers: HeaderMap::new(), body: Some(RequestBody::Form(form)) }
    }
}

/// Decode an API response body, treating 204 as an empty JSON object.
pub fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, Error> {
    if !status.is_success() {
        return Err(Error::HttpStatus { status: status.as_u16(), body: String::from_utf8_lossy(body).into_owned() });
    }

    let body: &[u8] = if status == StatusCode::NO_CONTENT || body.is_empty() { b"{}" } else { body };
    serde_json::from_slice(body).map_err(|e| Error::Decode(e.to_string()))
}

/// Cookie-authenticated client for the club REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://127.0.0.1:8080/api`).
    pub fn new(base_url: &str, config: &FetchConfig) -> Result<Self, Error> {
        let base_url = Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{base_url}: {e}")))?;
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    /// Absolute URL of an endpoint path such as `/users/me`.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}")).map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    /// Request builder for one call, with the body and headers attached.
    pub fn build(&self, path: &str, options: RequestOptions) -> Result<RequestBuilder, Error> {
        let url = self.endpoint(path)?;
        let builder = self.http.request(options.method, url.as_str());

        Ok(match options.body {
            Some(RequestBody::Form(form)) => builder.headers(options.headers).multipart(form),
            Some(RequestBody::Json(value)) => builder.headers(json_headers(options.headers)).json(&value),
            None => builder.headers(json_headers(options.headers)),
        })
    }

    /// Perform one API call and decode the JSON answer.
    pub async fn request<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T, Error> {
        let method = options.method.clone();
        let url = self.endpoint(path)?;
        let builder = self.build(path, options)?;

        let response = builder.send().await.map_err(|e| {
            tracing::error!("API request failed: {} {}: {}", method, url, e);
            Error::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!("API error response: {} {} -> {}", method, url, status.as_u16());
        }

        decode_response(status, &body)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(path, RequestOptions::default()).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T, Error> {
        self.request(path, RequestOptions::json(Method::POST, body)?).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<MessageResponse, Error> {
        self.post("/auth/login", credentials).await
    }

    pub async fn logout(&self) -> Result<MessageResponse, Error> {
        self.request("/auth/logout", RequestOptions::method(Method::POST)).await
    }

    pub async fn register(&self, user: &NewUser) -> Result<User, Error> {
        self.post("/auth/register", user).await
    }

    pub async fn current_user(&self) -> Result<User, Error> {
        self.get("/users/me").await
    }

    pub async fn users(&self) -> Result<Vec<User>, Error> {
        self.get("/users").await
    }

    pub async fn matches(&self) -> Result<Vec<Match>, Error> {
        self.get("/matches").await
    }

    pub async fn create_match(&self, new_match: &NewMatch) -> Result<Match, Error> {
        self.post("/matches", new_match).await
    }

    pub async fn pending_verifications(&self) -> Result<Vec<Match>, Error> {
        self.get("/verification/pending-verification").await
    }

    /// Active tournaments only, or every public tournament.
    pub async fn tournaments(&self, active_only: bool) -> Result<Vec<Tournament>, Error> {
        if active_only {
            self.get("/tournaments?active_only=true").await
        } else {
            self.get("/tournaments/public").await
        }
    }

    pub async fn tournament_leaderboard(&self, tournament_id: i64) -> Result<TournamentLeaderboard, Error> {
        self.get(&format!("/tournaments/{tournament_id}/leaderboard")).await
    }

    pub async fn my_invitations(&self) -> Result<Vec<TournamentInvitation>, Error> {
        self.get("/tournament-invitations/my-invitations").await
    }

    pub async fn unseen_reports_count(&self) -> Result<UnseenCount, Error> {
        self.get("/reports/unseen-count").await
    }

    pub async fn add_post_attachment(&self, post_id: i64, attachment: &NewAttachment) -> Result<Attachment, Error> {
        self.post(&format!("/posts/{post_id}/attachments"), attachment).await
    }

    pub async fn health_check(&self) -> Result<HealthStatus, Error> {
        self.get("/health").await
    }
}

fn json_headers(mut headers: HeaderMap) -> HeaderMap {
    headers
        .entry(header::CONTENT_TYPE)
        .or_insert(HeaderValue::from_static("application/json"));
    headers
}
