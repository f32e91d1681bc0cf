//! Time-bounded, size-bounded cache shared across requests.
//!
//! Entries expire a fixed time after insertion. When the cache is full the
//! oldest insertion is evicted; reads do not refresh an entry.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct TtlCache<K, V> {
    capacity: usize,
    ttl: Duration,
    inner: RwLock<Inner<K, V>>,
}

#[derive(Debug)]
struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    /// Keys in insertion order. A key replaced by a newer insertion leaves a
    /// stale record behind whose instant no longer matches its entry.
    order: VecDeque<(K, Instant)>,
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Number of entries, including ones that expired but were not purged yet.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.entries.clear();
        inner.order.clear();
    }

    fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let entry = inner.entries.get(key)?;
        if now.duration_since(entry.inserted_at) >= self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    fn insert_at(&self, key: K, value: V, now: Instant) {
        if self.capacity == 0 {
            return;
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.purge_expired(now, self.ttl);

        if !inner.entries.contains_key(&key) {
            while inner.entries.len() >= self.capacity {
                if !inner.evict_oldest() {
                    break;
                }
            }
        }

        inner.order.push_back((key.clone(), now));
        inner.entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
            },
        );
    }
}

impl<K, V> Inner<K, V>
where
    K: Eq + Hash,
{
    fn purge_expired(&mut self, now: Instant, ttl: Duration) {
        while let Some((_, inserted_at)) = self.order.front() {
            if now.duration_since(*inserted_at) < ttl {
                break;
            }
            self.evict_oldest();
        }
    }

    /// Pops the oldest insertion record, removing its entry if still current.
    fn evict_oldest(&mut self) -> bool {
        let Some((key, inserted_at)) = self.order.pop_front() else {
            return false;
        };
        if self
            .entries
            .get(&key)
            .is_some_and(|entry| entry.inserted_at == inserted_at)
        {
            self.entries.remove(&key);
        }
        true
    }
}
