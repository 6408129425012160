//! Cache Entry Module
//!
//! Defines the value slot stored for each key, with optional TTL metadata.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with its key, value and expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// The key this entry is indexed under
    pub key: K,
    /// The stored value
    pub value: V,
    /// Absolute expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
    /// Interval the entry was scheduled with, reused when it is refreshed
    pub ttl: Option<Duration>,
    /// Stamp of the schedule currently owning this entry
    pub generation: u64,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Lifetime of the entry, `Duration::ZERO` = never expires
    /// * `generation` - Schedule stamp assigned by the owning cache
    pub fn new(key: K, value: V, ttl: Duration, generation: u64) -> Self {
        let (ttl, expires_at) = deadline_for(ttl);
        Self {
            key,
            value,
            expires_at,
            ttl,
            generation,
        }
    }

    // == Renew ==
    /// Replaces the value and restarts the TTL clock under a new generation.
    pub fn renew(&mut self, value: V, ttl: Duration, generation: u64) {
        let (ttl, expires_at) = deadline_for(ttl);
        self.value = value;
        self.ttl = ttl;
        self.expires_at = expires_at;
        self.generation = generation;
    }

    // == Time To Live ==
    /// Returns the time left before the entry's deadline, or None if it never expires.
    ///
    /// Returns `Some(Duration::ZERO)` once the deadline has passed but the
    /// expiry action has not removed the entry yet.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}

/// A zero TTL, or one too large to represent as an instant, never expires.
fn deadline_for(ttl: Duration) -> (Option<Duration>, Option<Instant>) {
    if ttl.is_zero() {
        return (None, None);
    }
    match Instant::now().checked_add(ttl) {
        Some(at) => (Some(ttl), Some(at)),
        None => (None, None),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("key", "test_value", Duration::ZERO, 1);

        assert_eq!(entry.value, "test_value");
        assert!(entry.expires_at.is_none());
        assert!(entry.ttl.is_none());
        assert!(entry.ttl_remaining().is_none());
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new("key", "test_value", Duration::from_secs(60), 1);

        assert_eq!(entry.ttl, Some(Duration::from_secs(60)));
        assert!(entry.expires_at.is_some());

        let remaining = entry.ttl_remaining().unwrap();
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining >= Duration::from_secs(59));
    }

    #[test]
    fn test_ttl_remaining_after_deadline() {
        let entry = CacheEntry::new("key", 1, Duration::from_millis(20), 1);

        sleep(Duration::from_millis(40));

        assert_eq!(entry.ttl_remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_renew_resets_deadline_and_generation() {
        let mut entry = CacheEntry::new("key", 1, Duration::from_millis(10), 1);
        let first_deadline = entry.expires_at.unwrap();

        sleep(Duration::from_millis(5));
        entry.renew(2, Duration::from_secs(30), 7);

        assert_eq!(entry.value, 2);
        assert_eq!(entry.generation, 7);
        assert!(entry.expires_at.unwrap() > first_deadline);
    }

    #[test]
    fn test_renew_with_zero_ttl_clears_expiry() {
        let mut entry = CacheEntry::new("key", 1, Duration::from_secs(5), 1);
        entry.renew(1, Duration::ZERO, 2);

        assert!(entry.expires_at.is_none());
        assert!(entry.ttl.is_none());
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let entry = CacheEntry::new("key", 1, Duration::MAX, 1);

        assert!(entry.expires_at.is_none());
    }
}
