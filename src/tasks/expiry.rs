//! TTL Expiry Worker
//!
//! Background task that fires expiry actions for entries whose TTL has run out.
//!
//! Deadlines are kept in a min-heap shared with the cache under its lock. A
//! single worker sleeps until the earliest deadline (or until it is woken
//! because a new deadline was scheduled) and then asks the cache to expire
//! every due entry. Each deadline carries the generation of the entry it was
//! scheduled for; the cache discards it if the entry has since been removed,
//! evicted or re-added.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use tokio::sync::Notify;
use tracing::{debug, info, trace};

use crate::cache::Shared;
use crate::error::{CacheError, Result};

// == Deadline ==
#[derive(Debug)]
struct Deadline<K> {
    at: Instant,
    generation: u64,
    key: K,
}

impl<K> PartialEq for Deadline<K> {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.generation == other.generation
    }
}

impl<K> Eq for Deadline<K> {}

impl<K> PartialOrd for Deadline<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Deadline<K> {
    // Reversed so the BinaryHeap pops the earliest deadline first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.generation.cmp(&self.generation))
    }
}

// == Expiry Queue ==
/// Min-heap of pending expiry deadlines.
#[derive(Debug)]
pub(crate) struct ExpiryQueue<K> {
    heap: BinaryHeap<Deadline<K>>,
}

impl<K> Default for ExpiryQueue<K> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }
}

impl<K> ExpiryQueue<K> {
    pub(crate) fn schedule(&mut self, key: K, at: Instant, generation: u64) {
        self.heap.push(Deadline {
            at,
            generation,
            key,
        });
    }

    /// Pops every deadline at or before `now`, earliest first.
    pub(crate) fn pop_due(&mut self, now: Instant) -> Vec<(K, u64)> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|d| d.at <= now) {
            if let Some(deadline) = self.heap.pop() {
                due.push((deadline.key, deadline.generation));
            }
        }
        due
    }

    pub(crate) fn next_at(&self) -> Option<Instant> {
        self.heap.peek().map(|d| d.at)
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&K, u64) -> bool) {
        self.heap.retain(|d| keep(&d.key, d.generation));
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn clear(&mut self) {
        self.heap.clear();
    }
}

// == Expiry Signal ==
/// Wake-up channel between cache handles and the worker.
#[derive(Debug, Default)]
pub(crate) struct ExpirySignal {
    notify: Notify,
    closed: AtomicBool,
}

impl ExpirySignal {
    /// Wakes the worker so it re-reads the earliest deadline.
    ///
    /// A wake-up sent while the worker is busy is kept and consumed by its
    /// next wait, so none are lost.
    pub(crate) fn wake(&self) {
        self.notify.notify_one();
    }

    /// Asks the worker to stop.
    pub(crate) fn close(&self) {
        self.closed.store(true, AtomicOrdering::Release);
        self.notify.notify_one();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(AtomicOrdering::Acquire)
    }
}

/// Spawns the expiry worker on a dedicated thread running its own
/// current-thread tokio runtime.
///
/// The worker only holds a weak reference to the cache, and stops once the
/// signal is closed or the cache has been dropped.
///
/// # Arguments
/// * `shared` - Weak reference to the cache state
/// * `signal` - Wake-up/shutdown signal shared with the cache handle
/// * `thread_name` - Name given to the worker thread
///
/// # Errors
/// Returns an error if the runtime cannot be built or the thread cannot be spawned.
pub(crate) fn spawn_expiry_worker<K, V>(
    shared: Weak<Shared<K, V>>,
    signal: Arc<ExpirySignal>,
    thread_name: &str,
) -> Result<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(CacheError::Runtime)?;

    std::thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || runtime.block_on(run_expiry_loop(shared, signal)))
        .map_err(CacheError::WorkerSpawn)?;

    Ok(())
}

async fn run_expiry_loop<K, V>(shared: Weak<Shared<K, V>>, signal: Arc<ExpirySignal>)
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    info!("Starting TTL expiry worker");

    loop {
        if signal.is_closed() {
            break;
        }
        let Some(cache) = shared.upgrade() else {
            break;
        };

        let due = cache.take_due(Instant::now());
        if !due.is_empty() {
            debug!("TTL expiry: {} deadline(s) due", due.len());
        }
        for (key, generation) in due {
            cache.expire(&key, generation);
        }

        // Refreshes above may have scheduled new deadlines.
        let next = cache.next_deadline();
        drop(cache);

        match next {
            Some(at) => {
                trace!("TTL expiry: sleeping until next deadline");
                tokio::select! {
                    _ = tokio::time::sleep_until(at.into()) => {}
                    _ = signal.notify.notified() => {}
                }
            }
            None => signal.notify.notified().await,
        }
    }

    info!("TTL expiry worker stopped");
}
