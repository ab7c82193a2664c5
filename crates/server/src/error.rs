//! HTTP mapping of router errors for the control surface.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ServerError(#[from] pub birdie_core::Error);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("{}", self.0);
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use birdie_core::Error;

    #[test]
    fn test_status_mapping() {
        let resp = ServerError(Error::Lifecycle("installing".into())).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = ServerError(Error::Replay("offline".into())).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
