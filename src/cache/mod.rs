//! Cache Module
//!
//! Provides the in-process LRU cache with per-entry TTL expiry.

mod entry;
mod hooks;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use hooks::{OnEvicted, OnExpired};
pub use stats::CacheStats;
pub use store::Cache;

pub(crate) use entry::CacheEntry;
pub(crate) use lru::LruList;
pub(crate) use store::Shared;
