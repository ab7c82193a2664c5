//! Network side of birdie.
//!
//! This crate provides the reqwest-backed [`HttpFetcher`] the router uses as
//! its network, plus the typed REST client, session and badge counters of the
//! club app.

pub mod api;
pub mod badges;
pub mod fetch;
pub mod session;

pub use api::{ApiClient, RequestBody, RequestOptions};
pub use badges::Badges;
pub use fetch::{FetchConfig, HttpFetcher, RewriteRule, Upstreams};
pub use session::Session;
