//! Forwarding of intercepted client traffic through the router.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, Uri, header};

use birdie_core::{WorkerRequest, WorkerResponse};
use birdie_worker::FetchOutcome;

use crate::app::AppState;

const SEC_FETCH_MODE: &str = "sec-fetch-mode";

/// Rebuild the client's request against the public origin.
pub fn to_worker_request(
    public_origin: &str, method: Method, uri: &Uri, headers: HeaderMap, body: Bytes,
) -> Result<WorkerRequest, birdie_core::Error> {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let url = format!("{}{}", public_origin.trim_end_matches('/'), path_and_query);

    let navigate = headers
        .get(SEC_FETCH_MODE)
        .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"navigate"));

    let mut request = WorkerRequest::new(method, &url)?.with_body(body);
    request.headers = headers;
    if navigate {
        request = request.navigate();
    }
    Ok(request)
}

pub fn into_http_response(response: WorkerResponse) -> Response {
    let mut headers = response.headers;
    // Recomputed from the body actually sent.
    headers.remove(header::CONTENT_LENGTH);
    (response.status, headers, response.body).into_response()
}

pub async fn handle(State(state): State<AppState>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let request = match to_worker_request(&state.config.public_origin, method, &uri, headers, body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(%uri, "rejected request: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    match state.router.on_fetch(&request).await {
        FetchOutcome::Respond(response) => into_http_response(response),
        FetchOutcome::Passthrough => match state.fetcher.fetch(&request).await {
            Ok(response) => into_http_response(response),
            Err(e) => {
                tracing::warn!(method = %request.method, url = %request.url, "passthrough failed: {}", e);
                (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderName, HeaderValue};

    #[test]
    fn test_request_rebuilt_on_public_origin() {
        let uri: Uri = "/api/tournaments?active_only=true".parse().unwrap();
        let request =
            to_worker_request("http://club.local:8080/", Method::GET, &uri, HeaderMap::new(), Bytes::new()).unwrap();
        assert_eq!(request.url.as_str(), "http://club.local:8080/api/tournaments?active_only=true");
        assert!(!request.is_navigation());
    }

    #[test]
    fn test_navigation_header() {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(SEC_FETCH_MODE), HeaderValue::from_static("navigate"));
        let uri: Uri = "/profile".parse().unwrap();
        let request = to_worker_request("http://127.0.0.1:8080", Method::GET, &uri, headers, Bytes::new()).unwrap();
        assert!(request.is_navigation());
        assert!(request.headers.contains_key(SEC_FETCH_MODE));
    }

    #[test]
    fn test_content_length_dropped() {
        let response = WorkerResponse::new(StatusCode::OK)
            .with_header(header::CONTENT_LENGTH, HeaderValue::from_static("999"))
            .with_body("ok");
        let response = into_http_response(response);
        assert_ne!(response.headers().get(header::CONTENT_LENGTH).map(|v| v.as_bytes()), Some(&b"999"[..]));
    }
}
