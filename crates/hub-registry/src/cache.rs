//! Read-through TTL cache for registry reads.
//!
//! Entries are inserted whole and replaced whole once they expire; writes to
//! the registry never invalidate them. The lock is never held across an
//! upstream call, so two concurrent misses on one key both fetch and the
//! later insert wins.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh cached value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .filter(|(stored, _)| stored.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, (stored, _)| stored.elapsed() < self.ttl);
            entries.insert(key, (Instant::now(), value));
        }
    }

    /// Return the cached value or compute, store, and return a new one.
    ///
    /// Errors are returned as-is and never cached.
    ///
    /// # Errors
    ///
    /// Whatever `fetch` returns.
    pub async fn get_or_try_insert_with<E, F, Fut>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(&key) {
            tracing::trace!("cache hit");
            return Ok(hit);
        }
        let value = fetch().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn second_read_within_ttl_is_cached() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let fetches = AtomicUsize::new(0);
        for _ in 0..3 {
            let value: Result<u32, ()> = cache
                .get_or_try_insert_with("page-1", || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            assert_eq!(value, Ok(7));
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entry_is_replaced() {
        let cache = TtlCache::new(Duration::ZERO);
        let first: Result<&str, ()> = cache.get_or_try_insert_with(1, || async { Ok("a") }).await;
        let second: Result<&str, ()> = cache.get_or_try_insert_with(1, || async { Ok("b") }).await;
        assert_eq!(first, Ok("a"));
        assert_eq!(second, Ok("b"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache: TtlCache<u8, u8> = TtlCache::new(Duration::from_secs(60));
        let failed: Result<u8, &str> = cache.get_or_try_insert_with(1, || async { Err("down") }).await;
        assert_eq!(failed, Err("down"));
        assert!(cache.is_empty());
        let ok: Result<u8, &str> = cache.get_or_try_insert_with(1, || async { Ok(2) }).await;
        assert_eq!(ok, Ok(2));
    }

    #[test]
    fn keys_are_independent() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"c"), None);
    }
}
