//! Configuration Module
//!
//! Handles building cache configuration, optionally from environment variables.

use std::env;

/// Default name of the background expiry thread.
pub const DEFAULT_EXPIRY_THREAD_NAME: &str = "ttl-lru-expiry";

/// Cache configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold, 0 = unbounded
    pub capacity: usize,
    /// Name given to the background expiry thread
    pub expiry_thread_name: String,
}

impl Config {
    /// Creates a Config with the given capacity and default settings otherwise.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LRU_CAPACITY` - Maximum cache entries (default: 0, unbounded)
    /// - `LRU_EXPIRY_THREAD_NAME` - Expiry thread name (default: `ttl-lru-expiry`)
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("LRU_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            expiry_thread_name: env::var("LRU_EXPIRY_THREAD_NAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_EXPIRY_THREAD_NAME.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 0,
            expiry_thread_name: DEFAULT_EXPIRY_THREAD_NAME.to_string(),
        }
    }
}
