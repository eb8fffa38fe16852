use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex;

// Cache entry with a logical access clock for LRU eviction
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    last_access: u64,
}

/// Key-value store injected into the metadata layer. Provider data never
/// changes, so entries do not expire; they are only evicted for space.
pub trait Cache<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;
    fn insert(&self, key: K, value: V);
    fn remove(&self, key: &K) -> Option<V>;
    fn clear(&self);
    fn size(&self) -> usize;
    fn stats(&self) -> CacheStats;
}

// Statistics for cache monitoring
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

struct Store<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    clock: u64,
    stats: CacheStats,
}

/// Bounded in-memory cache evicting the least recently used entry when full.
pub struct InMemoryCache<K, V> {
    store: Mutex<Store<K, V>>,
    max_size: usize,
}

impl<K, V> InMemoryCache<K, V>
where
    K: Eq + Hash + Clone + Display + Send,
    V: Clone + Send,
{
    pub fn new(max_size: usize) -> Self {
        tracing::debug!("Initializing in-memory cache with max_size: {}", max_size);
        Self {
            store: Mutex::new(Store {
                entries: HashMap::new(),
                clock: 0,
                stats: CacheStats::default(),
            }),
            max_size: max_size.max(1),
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        match self.store.lock() {
            Ok(store) => store.entries.contains_key(key),
            Err(_) => false,
        }
    }

    fn evict_lru(store: &mut Store<K, V>) {
        let lru_key = store
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());

        if let Some(key) = lru_key {
            store.entries.remove(&key);
            store.stats.evictions += 1;
            tracing::debug!("Evicted LRU cache entry: {}", key);
        }
    }
}

impl<K, V> Cache<K, V> for InMemoryCache<K, V>
where
    K: Eq + Hash + Clone + Display + Send,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        let mut store = match self.store.lock() {
            Ok(store) => store,
            Err(e) => {
                tracing::error!("Failed to acquire cache lock for key {}: {}", key, e);
                return None;
            }
        };

        store.clock += 1;
        let clock = store.clock;
        let value = store.entries.get_mut(key).map(|entry| {
            entry.last_access = clock;
            entry.value.clone()
        });

        match value {
            Some(value) => {
                tracing::debug!("Cache hit for key: {}", key);
                store.stats.hits += 1;
                Some(value)
            }
            None => {
                tracing::debug!("Cache miss for key: {}", key);
                store.stats.misses += 1;
                None
            }
        }
    }

    fn insert(&self, key: K, value: V) {
        let mut store = match self.store.lock() {
            Ok(store) => store,
            Err(e) => {
                tracing::error!("Failed to acquire cache lock for insert {}: {}", key, e);
                return;
            }
        };

        if store.entries.len() >= self.max_size && !store.entries.contains_key(&key) {
            Self::evict_lru(&mut store);
        }

        store.clock += 1;
        let last_access = store.clock;
        store.entries.insert(key, CacheEntry { value, last_access });
        store.stats.inserts += 1;
    }

    fn remove(&self, key: &K) -> Option<V> {
        let mut store = self.store.lock().ok()?;
        store.entries.remove(key).map(|entry| entry.value)
    }

    fn clear(&self) {
        if let Ok(mut store) = self.store.lock() {
            store.entries.clear();
        }
    }

    fn size(&self) -> usize {
        self.store.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    fn stats(&self) -> CacheStats {
        self.store
            .lock()
            .map(|s| s.stats.clone())
            .unwrap_or_default()
    }
}

/// Return the cached value for `key`, or run `fetch` and cache its success.
/// Failures are passed through and not cached.
pub async fn get_or_fetch<K, V, E, C, F, Fut>(cache: &C, key: K, fetch: F) -> Result<V, E>
where
    C: Cache<K, V> + ?Sized,
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
{
    if let Some(value) = cache.get(&key) {
        return Ok(value);
    }
    let value = fetch().await?;
    cache.insert(key, value.clone());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hits_and_misses_are_counted() {
        let cache: InMemoryCache<u32, String> = InMemoryCache::new(4);
        assert_eq!(cache.get(&1), None);
        cache.insert(1, "bulbasaur".to_string());
        assert_eq!(cache.get(&1), Some("bulbasaur".to_string()));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let cache: InMemoryCache<u32, u32> = InMemoryCache::new(2);
        cache.insert(1, 10);
        cache.insert(2, 20);
        // Touch 1 so that 2 becomes the eviction candidate.
        cache.get(&1);
        cache.insert(3, 30);

        assert!(cache.contains_key(&1));
        assert!(!cache.contains_key(&2));
        assert!(cache.contains_key(&3));
        assert_eq!(cache.size(), 2);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_get_or_fetch_populates_once() {
        let cache: InMemoryCache<u32, u32> = InMemoryCache::new(8);
        let calls = std::sync::atomic::AtomicU32::new(0);

        for _ in 0..3 {
            let value: Result<u32, ()> = get_or_fetch(&cache, 7, || async {
                calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(49)
            })
            .await;
            assert_eq!(value, Ok(49));
        }

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache: InMemoryCache<u32, u32> = InMemoryCache::new(8);

        let failed: Result<u32, &str> = get_or_fetch(&cache, 7, || async { Err("offline") }).await;
        assert_eq!(failed, Err("offline"));
        assert!(!cache.contains_key(&7));

        let ok: Result<u32, &str> = get_or_fetch(&cache, 7, || async { Ok(1) }).await;
        assert_eq!(ok, Ok(1));
    }
}
