// src/core/cache.rs
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// In-memory TTL map keyed by URL. Nothing is persisted.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<String, (Instant, V)>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        self.entries
            .get(key)
            .filter(|(expires, _)| *expires > now)
            .map(|(_, v)| v.clone())
    }

    pub fn insert_at(&mut self, key: impl Into<String>, value: V, now: Instant) {
        self.entries.insert(key.into(), (now + self.ttl, value));
    }

    /// Drop expired entries; returns how many went.
    pub fn purge_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, (expires, _)| *expires > now);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_expire_after_ttl() {
        let t0 = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert_at("a", s!("body"), t0);

        assert_eq!(cache.get_at("a", t0 + Duration::from_secs(59)), Some(s!("body")));
        assert_eq!(cache.get_at("a", t0 + Duration::from_secs(60)), None);
        assert_eq!(cache.get_at("b", t0), None);
    }

    #[test]
    fn reinsert_refreshes_and_purge_drops_stale() {
        let t0 = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(10));
        cache.insert_at("a", 1u32, t0);
        cache.insert_at("b", 2u32, t0);
        cache.insert_at("a", 3u32, t0 + Duration::from_secs(8));

        assert_eq!(cache.purge_at(t0 + Duration::from_secs(12)), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_at("a", t0 + Duration::from_secs(12)), Some(3));
    }
}
