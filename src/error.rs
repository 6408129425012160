//! Error types for the cache
//!
//! Missing keys are not errors; the only fallible step is starting the
//! background expiry worker.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The tokio runtime driving expiry timers could not be built
    #[error("Failed to build expiry runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// The expiry worker thread could not be spawned
    #[error("Failed to spawn expiry worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
