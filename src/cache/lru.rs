//! LRU List Module
//!
//! Recency-ordered entry storage with O(1) key lookup, promotion and eviction.

use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::CacheEntry;

#[derive(Debug)]
struct Slot<K, V> {
    prev: Option<usize>,
    next: Option<usize>,
    entry: Option<CacheEntry<K, V>>,
}

// == LRU List ==
/// Doubly linked list of entries laid out in a slot arena, plus a key index.
///
/// Entries are ordered where:
/// - Front (head) = Most recently used
/// - Back (tail) = Least recently used
#[derive(Debug)]
pub struct LruList<K, V> {
    slots: Vec<Slot<K, V>>,
    /// Vacated slot indices, reused before the arena grows
    free: Vec<usize>,
    index: HashMap<K, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<K, V> Default for LruList<K, V> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
        }
    }
}

impl<K, V> LruList<K, V> {
    // == Length ==
    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl<K: Eq + Hash + Clone, V> LruList<K, V> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    // == Push Front ==
    /// Inserts a new entry as the most recently used one.
    ///
    /// The key must not already be present; callers promote existing keys
    /// through [`LruList::touch`] instead.
    pub fn push_front(&mut self, entry: CacheEntry<K, V>) {
        debug_assert!(!self.index.contains_key(&entry.key));

        let key = entry.key.clone();
        let slot = Slot {
            prev: None,
            next: None,
            entry: Some(entry),
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = slot;
                idx
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };

        self.attach_front(idx);
        self.index.insert(key, idx);
    }

    // == Touch ==
    /// Marks a key as recently used (moves it to the front).
    ///
    /// Returns the promoted entry, or None if the key is absent.
    pub fn touch(&mut self, key: &K) -> Option<&mut CacheEntry<K, V>> {
        let idx = *self.index.get(key)?;
        if self.head != Some(idx) {
            self.detach(idx);
            self.attach_front(idx);
        }
        self.slots[idx].entry.as_mut()
    }

    // == Get ==
    /// Looks up an entry without changing its recency.
    pub fn get(&self, key: &K) -> Option<&CacheEntry<K, V>> {
        let idx = *self.index.get(key)?;
        self.slots[idx].entry.as_ref()
    }

    // == Remove ==
    /// Removes a key and returns its entry.
    pub fn remove(&mut self, key: &K) -> Option<CacheEntry<K, V>> {
        let idx = self.index.remove(key)?;
        self.release(idx)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    ///
    /// Returns None if the list is empty.
    pub fn pop_back(&mut self) -> Option<CacheEntry<K, V>> {
        let idx = self.tail?;
        let entry = self.release(idx)?;
        self.index.remove(&entry.key);
        Some(entry)
    }

    // == Peek Back ==
    /// Returns the least recently used entry without removing it.
    #[cfg(test)]
    pub fn peek_back(&self) -> Option<&CacheEntry<K, V>> {
        self.tail.and_then(|idx| self.slots[idx].entry.as_ref())
    }

    // == Keys ==
    /// Iterates keys from most to least recently used.
    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let slot = &self.slots[cursor?];
            cursor = slot.next;
            slot.entry.as_ref().map(|entry| &entry.key)
        })
    }

    // == Drain ==
    /// Removes every entry, returning them oldest first.
    pub fn drain(&mut self) -> Vec<CacheEntry<K, V>> {
        let mut drained = Vec::with_capacity(self.len());
        while let Some(entry) = self.pop_back() {
            drained.push(entry);
        }
        self.slots.clear();
        self.free.clear();
        drained
    }

    // == Contains ==
    /// Checks if a key is present.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn attach_front(&mut self, idx: usize) {
        self.slots[idx].prev = None;
        self.slots[idx].next = self.head;
        match self.head {
            Some(old_head) => self.slots[old_head].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.slots[idx].prev = None;
        self.slots[idx].next = None;
    }

    /// Unlinks a slot and hands it back to the free list. Does not touch the index.
    fn release(&mut self, idx: usize) -> Option<CacheEntry<K, V>> {
        self.detach(idx);
        self.free.push(idx);
        self.slots[idx].entry.take()
    }
}
