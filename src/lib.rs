//! TTL LRU - A bounded in-process key/value cache
//!
//! Entries are evicted least-recently-used first once the cache is over
//! capacity, and removed by a background worker once their TTL runs out.
//! An expiry hook can veto the removal by returning the pair to keep.
//!
//! ```
//! use std::time::Duration;
//! use ttl_lru::Cache;
//!
//! let cache: Cache<String, u64> = Cache::new(100);
//! cache.set_on_expired(|key, value| {
//!     // Keep session counters alive, let everything else expire
//!     key.starts_with("session:").then(|| (key.clone(), *value))
//! });
//! cache.add("session:42".to_string(), 1, Duration::from_secs(30));
//! assert_eq!(cache.get(&"session:42".to_string()), Some(1));
//! ```

pub mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{Cache, CacheStats, OnEvicted, OnExpired};
pub use config::Config;
pub use error::{CacheError, Result};
