//! Offline cache router for the badminton club client.
//!
//! This crate provides:
//! - Request classification into static, cacheable API and network-only API
//! - Cache-first and network-first strategies over the stores in `birdie-core`
//! - The install / activate lifecycle
//! - Background sync replay, push notifications and notification clicks

pub mod classify;
pub mod lifecycle;
pub mod notify;
pub mod offline;
pub mod router;
pub mod strategy;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{Classification, Classifier};
pub use lifecycle::LifecycleState;
pub use notify::{NotificationAction, NotificationClick, NotificationData, NotificationRequest};
pub use router::{FetchOutcome, Router, RouterConfig};
pub use strategy::{ApiStrategy, StaticStrategy};
pub use sync::{NoopReplay, ReplayHook, SyncOutcome};
