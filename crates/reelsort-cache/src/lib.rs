//! Local filesystem content-addressed cache store (C5).
//!
//! Provides checksum-gated, TTL-gated, version-gated lookup/put of JSON
//! payloads under a cache root, with per-key advisory locking and
//! atomic writes.

pub mod error;
pub mod store;

pub use error::{CacheError, CacheResult};
pub use store::CacheStore;
