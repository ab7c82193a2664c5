//! Responses synthesized when the network is unreachable.

use birdie_core::WorkerResponse;
use http::StatusCode;

pub const NETWORK_UNAVAILABLE: &str = "Network unavailable";
pub const DATA_UNAVAILABLE_OFFLINE: &str = "Data unavailable offline";
pub const OFFLINE_TEXT: &str = "Offline";

/// `503 {"error":"Network unavailable"}`
pub fn network_unavailable() -> WorkerResponse {
    WorkerResponse::json_error(StatusCode::SERVICE_UNAVAILABLE, NETWORK_UNAVAILABLE)
}

/// `503 {"error":"Data unavailable offline"}`
pub fn data_unavailable_offline() -> WorkerResponse {
    WorkerResponse::json_error(StatusCode::SERVICE_UNAVAILABLE, DATA_UNAVAILABLE_OFFLINE)
}

/// `503 Offline`, plain text.
pub fn offline() -> WorkerResponse {
    WorkerResponse::text(StatusCode::SERVICE_UNAVAILABLE, OFFLINE_TEXT)
}
