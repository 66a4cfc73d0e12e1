//! In-memory TTL cache for upstream responses.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::time::Instant;
use tracing::trace;

/// Cache entry. Never mutated; a later `put` replaces it.
#[derive(Clone, Debug)]
struct CacheEntry {
    value: Value,
    fetched_at: Instant,
}

impl CacheEntry {
    /// An entry read exactly `ttl` after it was stored is still fresh.
    fn is_expired_at(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) > ttl
    }
}

/// Response cache keyed by canonical request URL.
///
/// Thread-safe. There is no size bound; stale entries are dropped when a
/// read finds them.
#[derive(Debug)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the cached value for `key` if it is still fresh.
    ///
    /// A stale entry is evicted as a side effect.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<Value> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired_at(now, self.ttl) => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // A concurrent put may have refreshed the entry since the read
        // lock was released; only drop it if it is still stale.
        let mut entries = self.entries.write();
        if entries
            .get(key)
            .is_some_and(|e| e.is_expired_at(now, self.ttl))
        {
            entries.remove(key);
            trace!(key, "Evicted stale entry");
        }
        None
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: impl Into<String>, value: Value) {
        self.entries.write().insert(
            key.into(),
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Clears all cached entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Returns the number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.entries.read();
        let expired = entries
            .values()
            .filter(|e| e.is_expired_at(now, self.ttl))
            .count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            fresh_entries: entries.len().saturating_sub(expired),
        }
    }
}

/// Cache statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Entries past their TTL but not yet evicted
    pub expired_entries: usize,
    /// Entries that would be served
    pub fresh_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(900);

    #[test]
    fn test_cache_put_get() {
        let cache = ResponseCache::new(TTL);
        cache.put("https://api/indicators?c=k&f=json", json!([{"Country": "Japan"}]));

        let value = cache.get("https://api/indicators?c=k&f=json").unwrap();
        assert_eq!(value[0]["Country"], "Japan");
    }

    #[test]
    fn test_cache_miss() {
        let cache = ResponseCache::new(TTL);
        assert!(cache.get("https://api/calendar").is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let cache = ResponseCache::new(TTL);
        cache.put("k", json!(1));
        cache.put("k", json!(2));
        assert_eq!(cache.get("k"), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_raw_text_values() {
        let cache = ResponseCache::new(TTL);
        cache.put("k", Value::String("No Access to this country".into()));
        assert_eq!(cache.get("k"), Some(json!("No Access to this country")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_until_ttl_inclusive() {
        let cache = ResponseCache::new(TTL);
        cache.put("k", json!({"v": 1}));

        tokio::time::advance(TTL).await;
        let now = Instant::now();
        // Same instant, same answer.
        assert!(cache.get_at("k", now).is_some());
        assert!(cache.get_at("k", now).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_evicted_on_read() {
        let cache = ResponseCache::new(TTL);
        cache.put("k", json!({"v": 1}));

        tokio::time::advance(TTL + Duration::from_millis(1)).await;
        assert_eq!(cache.len(), 1);
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_after_expiry() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        cache.put("k", json!("old"));

        tokio::time::advance(Duration::from_secs(11)).await;
        cache.put("k", json!("new"));
        assert_eq!(cache.get("k"), Some(json!("new")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_split_fresh_and_expired() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        cache.put("old", json!(1));
        tokio::time::advance(Duration::from_secs(11)).await;
        cache.put("new", json!(2));

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(stats.fresh_entries, 1);

        assert!(cache.get("old").is_none());
        assert_eq!(cache.stats().total_entries, 1);
    }

    #[test]
    fn test_clear() {
        let cache = ResponseCache::new(TTL);
        cache.put("a", json!(1));
        cache.put("b", json!(2));

        cache.clear();
        assert!(cache.is_empty());
    }
}
