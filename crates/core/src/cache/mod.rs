//! SQLite-backed named cache stores.
//!
//! A [`CacheStorage`] holds any number of named [`CacheStore`]s, each mapping
//! a request identity to a response snapshot. It supports:
//!
//! - Lazy store creation on first write
//! - Whole-store deletion (used to retire old generations)
//! - Last-writer-wins upserts per request key
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheStorage;
pub use entries::CachedResponse;
pub use stores::{CacheStore, StoreSummary};
