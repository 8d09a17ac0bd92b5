/// Cache configuration per tier
///
/// - Live aggregates: tiny capacity, short TTL (safety net if refreshes stall)
/// - Immutable objects: large capacity, long TTL (blocks and txs never change)
use crate::config::CacheSettings;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live for cached entries
    pub ttl: Duration,

    /// Maximum number of entries (LRU eviction when exceeded)
    pub capacity: usize,
}

impl CacheConfig {
    /// Live snapshot tier (a handful of keys refreshed every cycle)
    pub fn live() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            capacity: 16,
        }
    }

    /// Blocks and transactions addressed by hash
    pub fn immutable() -> Self {
        Self {
            ttl: Duration::from_secs(3600), // 1 hour
            capacity: 1000,
        }
    }

    pub fn live_from(settings: &CacheSettings) -> Self {
        Self::custom(settings.live_ttl_secs, settings.live_capacity)
    }

    pub fn immutable_from(settings: &CacheSettings) -> Self {
        Self::custom(settings.immutable_ttl_secs, settings.immutable_capacity)
    }

    /// Custom configuration
    pub fn custom(ttl_secs: u64, capacity: usize) -> Self {
        Self {
            ttl: Duration::from_secs(ttl_secs),
            capacity,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}
