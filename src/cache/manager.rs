/// Generic in-memory cache with TTL and LRU eviction
///
/// Thread-safe, generic over key/value types. Expired and evicted entries are
/// indistinguishable from absent ones. Tracks metrics for monitoring.
use super::config::CacheConfig;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Cache entry with TTL tracking
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

/// Cache metrics for monitoring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub inserts: u64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheState<K, V> {
    data: HashMap<K, CacheEntry<V>>,
    access_order: VecDeque<K>, // front = least recently used
    metrics: CacheMetrics,
}

impl<K: Clone + Eq + Hash, V> CacheState<K, V> {
    fn touch(&mut self, key: &K) {
        self.access_order.retain(|k| k != key);
        self.access_order.push_back(key.clone());
    }

    fn forget(&mut self, key: &K) {
        self.data.remove(key);
        self.access_order.retain(|k| k != key);
    }

    fn insert(&mut self, key: K, value: V, capacity: usize) {
        if !self.data.contains_key(&key) {
            while self.data.len() >= capacity {
                let Some(lru_key) = self.access_order.pop_front() else {
                    break;
                };
                self.data.remove(&lru_key);
                self.metrics.evictions += 1;
            }
        }

        // Re-setting a key restarts its TTL clock
        self.data.insert(key.clone(), CacheEntry::new(value));
        self.touch(&key);
        self.metrics.inserts += 1;
    }
}

/// Generic cache manager
pub struct CacheManager<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    config: CacheConfig,
    state: Mutex<CacheState<K, V>>,
}

impl<K, V> CacheManager<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CacheState {
                data: HashMap::new(),
                access_order: VecDeque::new(),
                metrics: CacheMetrics::default(),
            }),
        }
    }

    /// Get value from cache (None if expired, evicted or never set)
    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.state.lock();

        let expired = match state.data.get(key).map(|entry| entry.is_expired(self.config.ttl)) {
            None => {
                state.metrics.misses += 1;
                return None;
            }
            Some(expired) => expired,
        };

        if expired {
            state.forget(key);
            state.metrics.misses += 1;
            state.metrics.expirations += 1;
            return None;
        }

        state.touch(key);
        state.metrics.hits += 1;
        state.data.get(key).map(|entry| entry.value.clone())
    }

    /// Insert value into cache (evicts LRU if at capacity)
    pub fn insert(&self, key: K, value: V) {
        let mut state = self.state.lock();
        state.insert(key, value, self.config.capacity);
    }

    /// Insert several entries under one lock so readers see all or none
    pub fn insert_many(&self, entries: impl IntoIterator<Item = (K, V)>) {
        let mut state = self.state.lock();
        for (key, value) in entries {
            state.insert(key, value, self.config.capacity);
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        let state = self.state.lock();
        state
            .data
            .get(key)
            .map(|entry| !entry.is_expired(self.config.ttl))
            .unwrap_or(false)
    }

    /// Drop every expired entry, returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut state = self.state.lock();
        let ttl = self.config.ttl;
        let expired: Vec<K> = state
            .data
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.forget(key);
        }
        state.metrics.expirations += expired.len() as u64;
        expired.len()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.data.clear();
        state.access_order.clear();
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.state.lock().metrics.clone()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.state.lock().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
