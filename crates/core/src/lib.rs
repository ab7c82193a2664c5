//! Core types and shared functionality for birdie.
//!
//! This crate provides:
//! - Named cache stores with a SQLite backend
//! - The request/response model and the [`Fetcher`] network seam
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod message;
pub mod url;

pub use cache::{CacheStorage, CacheStore, CachedResponse, StoreSummary};
pub use config::{AppConfig, ConfigError, NotificationConfig};
pub use error::Error;
pub use fetch::{FetchError, Fetcher};
pub use message::{RequestMode, WorkerRequest, WorkerResponse};
