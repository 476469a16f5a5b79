//! Single-entry cache with explicit expiry, used to avoid refetching the
//! document on every read-count lookup.
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entry: Mutex<Option<Entry<K, V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: PartialEq + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Value stored for `key` if it is younger than the TTL at `now`.
    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let guard = self.entry.lock().ok()?;
        let entry = guard.as_ref()?;
        if entry.key != *key {
            return None;
        }
        if now.saturating_duration_since(entry.stored_at) >= self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn set(&self, key: K, value: V) {
        self.set_at(key, value, Instant::now())
    }

    pub fn set_at(&self, key: K, value: V, now: Instant) {
        if let Ok(mut guard) = self.entry.lock() {
            *guard = Some(Entry {
                key,
                value,
                stored_at: now,
            });
        }
    }

    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.entry.lock() {
            guard.take();
        }
    }
}
