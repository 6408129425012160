//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a simple recency-ordered model.

use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::Cache;

// == Strategies ==
/// Small key space so sequences revisit keys often
fn key_strategy() -> impl Strategy<Value = u8> {
    0u8..24
}

#[derive(Debug, Clone)]
enum CacheOp {
    Add { key: u8, value: u32 },
    Get { key: u8 },
    Remove { key: u8 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), any::<u32>()).prop_map(|(key, value)| CacheOp::Add { key, value }),
        2 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
    ]
}

// == Model ==
/// Reference LRU: front = most recently used.
#[derive(Default)]
struct Model {
    order: VecDeque<(u8, u32)>,
}

impl Model {
    fn take(&mut self, key: u8) -> Option<(u8, u32)> {
        let pos = self.order.iter().position(|(k, _)| *k == key)?;
        self.order.remove(pos)
    }

    fn add(&mut self, key: u8, value: u32, capacity: usize) -> Vec<(u8, u32)> {
        self.take(key);
        self.order.push_front((key, value));
        let mut evicted = Vec::new();
        while capacity > 0 && self.order.len() > capacity {
            if let Some(entry) = self.order.pop_back() {
                evicted.push(entry);
            }
        }
        evicted
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let entry = self.take(key)?;
        self.order.push_front(entry);
        Some(entry.1)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // For any sequence of operations the cache agrees with the model on
    // lookups, length and which entries were evicted, oldest first.
    #[test]
    fn prop_matches_lru_model(
        capacity in 0usize..8,
        ops in prop::collection::vec(cache_op_strategy(), 1..80),
    ) {
        let cache = Cache::new(capacity);
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        cache.set_on_evicted(move |k: &u8, v: &u32| sink.lock().push((*k, *v)));

        let mut model = Model::default();
        let mut expected_evicted = Vec::new();

        for op in ops {
            match op {
                CacheOp::Add { key, value } => {
                    cache.add(key, value, Duration::ZERO);
                    expected_evicted.extend(model.add(key, value, capacity));
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key), model.get(key));
                }
                CacheOp::Remove { key } => {
                    prop_assert_eq!(cache.remove(&key), model.take(key).map(|(_, v)| v));
                }
            }
            if capacity > 0 {
                prop_assert!(cache.len() <= capacity);
            }
            prop_assert_eq!(cache.len(), model.order.len());
        }

        prop_assert_eq!(&*evicted.lock(), &expected_evicted);
    }

    // Add followed immediately by get always hits with the stored value.
    #[test]
    fn prop_add_then_get(key in "[a-zA-Z0-9_]{1,32}", value in any::<u64>(), capacity in 1usize..16) {
        let cache = Cache::new(capacity);
        cache.add(key.clone(), value, Duration::ZERO);
        prop_assert_eq!(cache.get(&key), Some(value));
    }

    // Remove drops exactly one entry and makes it unreachable.
    #[test]
    fn prop_remove_then_get(keys in prop::collection::hash_set(key_strategy(), 1..20)) {
        let cache = Cache::new(0);
        for key in &keys {
            cache.add(*key, u32::from(*key), Duration::ZERO);
        }

        for key in &keys {
            let before = cache.len();
            cache.remove(key);
            prop_assert_eq!(cache.len(), before - 1);
            prop_assert_eq!(cache.get(key), None);
        }
        prop_assert!(cache.is_empty());
    }

    // Stats count hits and misses exactly.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let cache = Cache::new(10);
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;

        for op in ops {
            match op {
                CacheOp::Add { key, value } => cache.add(key, value, Duration::ZERO),
                CacheOp::Get { key } => match cache.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Remove { key } => {
                    cache.remove(&key);
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.total_entries, cache.len());
    }
}
