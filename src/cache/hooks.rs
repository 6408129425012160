//! Cache Hooks
//!
//! Optional callbacks the cache invokes when entries leave it.

use std::sync::Arc;

/// Called with the key and value of every entry removed to honour capacity.
pub type OnEvicted<K, V> = Arc<dyn Fn(&K, &V) + Send + Sync>;

/// Called when an entry's TTL runs out.
///
/// Returning `None` lets the entry expire. Returning `Some((key, value))`
/// re-adds that pair with the entry's original TTL; the returned key may
/// differ from the expiring one, in which case the old key is dropped.
pub type OnExpired<K, V> = Arc<dyn Fn(&K, &V) -> Option<(K, V)> + Send + Sync>;
