//! Background Tasks Module
//!
//! Contains the tasks that run alongside the cache.
//!
//! # Tasks
//! - TTL Expiry: Fires expiry actions for entries whose TTL has run out

mod expiry;

pub(crate) use expiry::{spawn_expiry_worker, ExpiryQueue, ExpirySignal};
