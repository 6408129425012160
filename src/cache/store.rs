//! Cache Store Module
//!
//! Main cache engine combining the LRU list with TTL expiry and eviction hooks.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheStats, LruList, OnEvicted, OnExpired};
use crate::config::Config;
use crate::error::Result;
use crate::tasks::{spawn_expiry_worker, ExpiryQueue, ExpirySignal};

// == Cache State ==
/// Everything guarded by the cache lock: entries, deadlines, counters and hooks.
pub(crate) struct State<K, V> {
    entries: LruList<K, V>,
    deadlines: ExpiryQueue<K>,
    stats: CacheStats,
    next_generation: u64,
    on_evicted: Option<OnEvicted<K, V>>,
    on_expired: Option<OnExpired<K, V>>,
}

impl<K: Eq + Hash + Clone, V> State<K, V> {
    fn new() -> Self {
        Self {
            entries: LruList::new(),
            deadlines: ExpiryQueue::default(),
            stats: CacheStats::new(),
            next_generation: 0,
            on_evicted: None,
            on_expired: None,
        }
    }

    /// Inserts or updates `key` at the front, schedules its deadline and
    /// returns the entries evicted to get back within `capacity`, oldest first.
    fn insert(
        &mut self,
        key: K,
        value: V,
        ttl: Duration,
        capacity: usize,
    ) -> Vec<CacheEntry<K, V>> {
        self.next_generation += 1;
        let generation = self.next_generation;

        let expires_at = match self.entries.touch(&key) {
            Some(entry) => {
                entry.renew(value, ttl, generation);
                entry.expires_at
            }
            None => {
                let entry = CacheEntry::new(key.clone(), value, ttl, generation);
                let expires_at = entry.expires_at;
                self.entries.push_front(entry);
                expires_at
            }
        };

        if let Some(at) = expires_at {
            self.deadlines.schedule(key, at, generation);
            self.compact_deadlines();
        }

        let mut evicted = Vec::new();
        while capacity > 0 && self.entries.len() > capacity {
            match self.entries.pop_back() {
                Some(entry) => {
                    self.stats.record_eviction();
                    evicted.push(entry);
                }
                None => break,
            }
        }
        if !evicted.is_empty() {
            trace!("LRU eviction: removed {} entries over capacity", evicted.len());
        }
        evicted
    }

    /// Whether `key` is still owned by the schedule stamped `generation`.
    fn is_current(&self, key: &K, generation: u64) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.generation == generation)
    }

    fn expire_entry(&mut self, key: &K) {
        if let Some(entry) = self.entries.remove(key) {
            self.stats.record_expiration();
            debug!(generation = entry.generation, "TTL expiry: entry removed");
        }
    }

    /// Drops deadlines of entries that were removed or rescheduled once they
    /// outnumber the live entries by a wide margin.
    fn compact_deadlines(&mut self) {
        if self.deadlines.len() <= 2 * self.entries.len() + 64 {
            return;
        }
        let entries = &self.entries;
        self.deadlines.retain(|key, generation| {
            entries
                .get(key)
                .is_some_and(|entry| entry.generation == generation)
        });
    }
}

// == Shared ==
/// Cache internals shared between the public handle and the expiry worker.
pub(crate) struct Shared<K, V> {
    state: Mutex<State<K, V>>,
    capacity: usize,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub(crate) fn take_due(&self, now: Instant) -> Vec<(K, u64)> {
        self.state.lock().deadlines.pop_due(now)
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.state.lock().deadlines.next_at()
    }

    // == Expire ==
    /// Runs the expiry action for `key` if it is still scheduled under `generation`.
    ///
    /// The expiry handler runs with the lock released. Its decision is only
    /// applied if nobody re-added or removed the key in the meantime.
    pub(crate) fn expire(&self, key: &K, generation: u64) {
        let (handler, value, ttl) = {
            let mut state = self.state.lock();
            if !state.is_current(key, generation) {
                return;
            }
            let Some(handler) = state.on_expired.clone() else {
                state.expire_entry(key);
                return;
            };
            let Some((value, ttl)) = state
                .entries
                .get(key)
                .map(|entry| (entry.value.clone(), entry.ttl))
            else {
                return;
            };
            (handler, value, ttl)
        };

        let decision = handler(key, &value);

        let (evicted, on_evicted) = {
            let mut state = self.state.lock();
            if !state.is_current(key, generation) {
                debug!(generation, "TTL expiry: entry changed while its handler ran");
                return;
            }
            match decision {
                None => {
                    state.expire_entry(key);
                    return;
                }
                Some((new_key, new_value)) => {
                    if new_key != *key {
                        state.entries.remove(key);
                    }
                    state.stats.record_refresh();
                    debug!(generation, "TTL expiry: entry refreshed");
                    let evicted =
                        state.insert(new_key, new_value, ttl.unwrap_or_default(), self.capacity);
                    (evicted, state.on_evicted.clone())
                }
            }
        };

        notify_evicted(on_evicted, evicted);
    }
}

/// Runs the eviction hook for each entry, outside the cache lock.
fn notify_evicted<K, V>(hook: Option<OnEvicted<K, V>>, evicted: Vec<CacheEntry<K, V>>) {
    if let Some(hook) = hook {
        for entry in &evicted {
            hook(&entry.key, &entry.value);
        }
    }
}

// == Cache ==
/// Thread-safe LRU cache with per-entry TTL expiry.
///
/// All operations take `&self`; share the cache between threads with an
/// `Arc`. Hooks run on the thread that triggered them, after the cache lock
/// is released, so they may call back into the cache.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ttl_lru::Cache;
///
/// let cache = Cache::new(2);
/// cache.add("a", 1, Duration::ZERO);
/// cache.add("b", 2, Duration::from_secs(60));
/// assert_eq!(cache.get(&"a"), Some(1));
///
/// cache.add("c", 3, Duration::ZERO); // evicts "b", the least recently used
/// assert_eq!(cache.get(&"b"), None);
/// ```
pub struct Cache<K, V> {
    shared: Arc<Shared<K, V>>,
    signal: Arc<ExpirySignal>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates a new cache holding at most `capacity` entries, 0 = unbounded.
    ///
    /// # Panics
    /// Panics if the background expiry worker cannot be started. Use
    /// [`Cache::with_config`] to handle that case.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(&Config::with_capacity(capacity))
            .expect("failed to start cache expiry worker")
    }

    /// Creates a new cache from configuration and starts its expiry worker.
    ///
    /// # Errors
    /// Returns an error if the expiry worker cannot be started.
    pub fn with_config(config: &Config) -> Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(State::new()),
            capacity: config.capacity,
        });
        let signal = Arc::new(ExpirySignal::default());
        spawn_expiry_worker(
            Arc::downgrade(&shared),
            Arc::clone(&signal),
            &config.expiry_thread_name,
        )?;
        Ok(Self { shared, signal })
    }

    // == Add ==
    /// Stores a key-value pair as the most recently used entry.
    ///
    /// If the key already exists, its value is replaced, its TTL is reset and
    /// any previously scheduled expiry is dropped. If the cache grows past its
    /// capacity, least recently used entries are evicted, oldest first, and
    /// passed to the eviction hook.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Lifetime of the entry, `Duration::ZERO` = never expires
    pub fn add(&self, key: K, value: V, ttl: Duration) {
        let (evicted, on_evicted) = {
            let mut state = self.shared.state.lock();
            let evicted = state.insert(key, value, ttl, self.shared.capacity);
            (evicted, state.on_evicted.clone())
        };
        if !ttl.is_zero() {
            self.signal.wake();
        }
        notify_evicted(on_evicted, evicted);
    }

    // == Get ==
    /// Retrieves a value by key and marks it as most recently used.
    ///
    /// An entry whose deadline has passed stays visible until the expiry
    /// worker has actually removed it.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.shared.state.lock();
        let value = state.entries.touch(key).map(|entry| entry.value.clone());
        match value {
            Some(value) => {
                state.stats.record_hit();
                Some(value)
            }
            None => {
                state.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Retrieves a value without changing its recency or the hit/miss counters.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.shared
            .state
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.value.clone())
    }

    // == Contains ==
    /// Checks if a key is present without changing its recency.
    pub fn contains(&self, key: &K) -> bool {
        self.shared.state.lock().entries.contains(key)
    }

    // == Time To Live ==
    /// Returns the time left before `key` expires.
    ///
    /// Returns None if the key is absent or never expires.
    pub fn ttl_remaining(&self, key: &K) -> Option<Duration> {
        self.shared
            .state
            .lock()
            .entries
            .get(key)
            .and_then(CacheEntry::ttl_remaining)
    }

    // == Remove ==
    /// Removes an entry by key and returns its value.
    ///
    /// Its pending expiry, if any, will never fire. No hook is called.
    pub fn remove(&self, key: &K) -> Option<V> {
        let removed = self.shared.state.lock().entries.remove(key);
        removed.map(|entry| entry.value)
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, passing it to the eviction hook.
    pub fn remove_oldest(&self) -> Option<(K, V)> {
        let (entry, on_evicted) = {
            let mut state = self.shared.state.lock();
            let entry = state.entries.pop_back()?;
            state.stats.record_eviction();
            (entry, state.on_evicted.clone())
        };
        if let Some(hook) = on_evicted {
            hook(&entry.key, &entry.value);
        }
        Some((entry.key, entry.value))
    }

    // == Clear ==
    /// Removes every entry, passing each to the eviction hook, oldest first.
    pub fn clear(&self) {
        let (evicted, on_evicted) = {
            let mut state = self.shared.state.lock();
            let evicted = state.entries.drain();
            state.deadlines.clear();
            for _ in &evicted {
                state.stats.record_eviction();
            }
            (evicted, state.on_evicted.clone())
        };
        notify_evicted(on_evicted, evicted);
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().entries.is_empty()
    }

    // == Capacity ==
    /// Maximum number of entries, 0 = unbounded.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.shared.state.lock();
        let mut stats = state.stats.clone();
        stats.total_entries = state.entries.len();
        stats
    }

    // == Hooks ==
    /// Registers the hook called for entries evicted to honour capacity.
    pub fn set_on_evicted<F>(&self, hook: F)
    where
        F: Fn(&K, &V) + Send + Sync + 'static,
    {
        self.shared.state.lock().on_evicted = Some(Arc::new(hook));
    }

    /// Registers the hook consulted when an entry's TTL runs out.
    ///
    /// See [`OnExpired`] for the meaning of its return value.
    pub fn set_on_expired<F>(&self, hook: F)
    where
        F: Fn(&K, &V) -> Option<(K, V)> + Send + Sync + 'static,
    {
        self.shared.state.lock().on_expired = Some(Arc::new(hook));
    }

    /// Unregisters the eviction hook.
    pub fn clear_on_evicted(&self) {
        self.shared.state.lock().on_evicted = None;
    }

    /// Unregisters the expiry hook; expiring entries are then always removed.
    pub fn clear_on_expired(&self) {
        self.shared.state.lock().on_expired = None;
    }
}

impl<K, V> Drop for Cache<K, V> {
    fn drop(&mut self) {
        self.signal.close();
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Cache")
            .field("len", &state.entries.len())
            .field("capacity", &self.shared.capacity)
            .field("stats", &state.stats)
            .finish()
    }
}
