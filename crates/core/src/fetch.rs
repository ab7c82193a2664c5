//! The network seam.
//!
//! The router never talks to the network directly; it goes through a
//! [`Fetcher`], which the host adapter supplies (reqwest in production,
//! scripted doubles in tests).

use crate::message::{WorkerRequest, WorkerResponse};

/// Transport-level failure: the request could not be made or completed.
///
/// A non-2xx status is NOT a fetch error; it is a normal response.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Performs network fetches on behalf of the router.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Send the request and return whatever the network answered.
    async fn fetch(&self, request: &WorkerRequest) -> Result<WorkerResponse, FetchError>;
}
