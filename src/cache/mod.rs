//! Two cache tiers in front of the indexing service
//!
//! - [`LiveCache`]: the refresh loop's published aggregates (dashboard
//!   snapshot, recent blocks, tip height, mempool, block reward). Written
//!   only by the Update Manager, in one coordinated write per cycle.
//! - [`ObjectCache`]: blocks and transactions by hash. Any reader may
//!   populate it on a miss; the same key always maps to the same object, so
//!   concurrent writers are harmless.

pub mod config;
pub mod manager;

pub use config::CacheConfig;
pub use manager::{CacheManager, CacheMetrics};

use crate::apis::{Block, MempoolTx, Transaction};
use crate::snapshot::DashboardSnapshot;
use std::sync::Arc;

// ============================================================================
// LIVE TIER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiveKey {
    Dashboard,
    Blocks,
    TipHeight,
    Mempool,
    BlockReward,
}

impl LiveKey {
    pub const ALL: [LiveKey; 5] = [
        LiveKey::Dashboard,
        LiveKey::Blocks,
        LiveKey::TipHeight,
        LiveKey::Mempool,
        LiveKey::BlockReward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LiveKey::Dashboard => "dashboard",
            LiveKey::Blocks => "blocks",
            LiveKey::TipHeight => "tip_height",
            LiveKey::Mempool => "mempool",
            LiveKey::BlockReward => "block_reward",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        LiveKey::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

#[derive(Debug, Clone)]
pub enum LiveValue {
    Dashboard(Arc<DashboardSnapshot>),
    Blocks(Arc<Vec<Block>>),
    TipHeight(u64),
    Mempool(Arc<Vec<MempoolTx>>),
    BlockReward(u64),
}

pub struct LiveCache {
    inner: CacheManager<LiveKey, LiveValue>,
}

impl LiveCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: CacheManager::new(config),
        }
    }

    pub fn get(&self, key: LiveKey) -> Option<LiveValue> {
        self.inner.get(&key)
    }

    /// Single-key write, restarting that key's TTL clock
    pub fn set(&self, key: LiveKey, value: LiveValue) {
        self.inner.insert(key, value);
    }

    pub fn dashboard(&self) -> Option<Arc<DashboardSnapshot>> {
        match self.get(LiveKey::Dashboard)? {
            LiveValue::Dashboard(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn blocks(&self) -> Option<Arc<Vec<Block>>> {
        match self.get(LiveKey::Blocks)? {
            LiveValue::Blocks(blocks) => Some(blocks),
            _ => None,
        }
    }

    pub fn tip_height(&self) -> Option<u64> {
        match self.get(LiveKey::TipHeight)? {
            LiveValue::TipHeight(height) => Some(height),
            _ => None,
        }
    }

    pub fn mempool(&self) -> Option<Arc<Vec<MempoolTx>>> {
        match self.get(LiveKey::Mempool)? {
            LiveValue::Mempool(txs) => Some(txs),
            _ => None,
        }
    }

    pub fn block_reward(&self) -> Option<u64> {
        match self.get(LiveKey::BlockReward)? {
            LiveValue::BlockReward(reward) => Some(reward),
            _ => None,
        }
    }

    /// Replace the live keys in one write. The block reward key is only
    /// written once a reward is known, a placeholder stays absent.
    pub(crate) fn publish(&self, snapshot: Arc<DashboardSnapshot>, mempool: Arc<Vec<MempoolTx>>) {
        let blocks = Arc::new(snapshot.blocks.clone());
        let mut entries = vec![
            (LiveKey::Blocks, LiveValue::Blocks(blocks)),
            (LiveKey::TipHeight, LiveValue::TipHeight(snapshot.tip_height)),
            (LiveKey::Mempool, LiveValue::Mempool(mempool)),
        ];
        if !snapshot.block_reward.is_default() {
            entries.push((
                LiveKey::BlockReward,
                LiveValue::BlockReward(snapshot.block_reward.value()),
            ));
        }
        entries.push((LiveKey::Dashboard, LiveValue::Dashboard(snapshot)));
        self.inner.insert_many(entries);
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.inner.metrics()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ============================================================================
// IMMUTABLE TIER
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CachedObject {
    Block(Arc<Block>),
    Transaction(Arc<Transaction>),
}

pub fn block_key(hash: &str) -> String {
    format!("block:{}", hash)
}

pub fn transaction_key(txid: &str) -> String {
    format!("tx:{}", txid)
}

pub struct ObjectCache {
    inner: CacheManager<String, CachedObject>,
}

impl ObjectCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: CacheManager::new(config),
        }
    }

    pub fn get(&self, key: &str) -> Option<CachedObject> {
        self.inner.get(&key.to_string())
    }

    pub fn set(&self, key: impl Into<String>, value: CachedObject) {
        self.inner.insert(key.into(), value);
    }

    pub fn block(&self, hash: &str) -> Option<Arc<Block>> {
        match self.get(&block_key(hash))? {
            CachedObject::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn put_block(&self, block: Block) -> Arc<Block> {
        let block = Arc::new(block);
        self.set(block_key(&block.hash), CachedObject::Block(block.clone()));
        block
    }

    pub fn transaction(&self, txid: &str) -> Option<Arc<Transaction>> {
        match self.get(&transaction_key(txid))? {
            CachedObject::Transaction(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn put_transaction(&self, tx: Transaction) -> Arc<Transaction> {
        let tx = Arc::new(tx);
        self.set(transaction_key(&tx.txid), CachedObject::Transaction(tx.clone()));
        tx
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.inner.metrics()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Provenance;
    use crate::testing::{block, coinbase_tx};
    use chrono::Utc;
    use std::time::Duration;

    fn snapshot(cycle: u64, tip: u64) -> DashboardSnapshot {
        DashboardSnapshot {
            cycle,
            tip_height: tip,
            hashrate: 1.0,
            avg_block_time: Provenance::Fresh(600.0),
            mempool_count: Provenance::Fresh(2),
            difficulty: 1.0,
            supply: Provenance::Default(0.0),
            block_reward: Provenance::Fresh(625_000_000),
            blocks: vec![block(tip, 1_700_000_000)],
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_publish_sets_every_live_key() {
        let live = LiveCache::new(CacheConfig::live());
        assert!(live.dashboard().is_none());

        live.publish(Arc::new(snapshot(1, 100)), Arc::new(Vec::new()));

        assert_eq!(live.dashboard().unwrap().tip_height, 100);
        assert_eq!(live.tip_height(), Some(100));
        assert_eq!(live.blocks().unwrap()[0].height, 100);
        assert_eq!(live.block_reward(), Some(625_000_000));
        assert!(live.mempool().unwrap().is_empty());
        assert_eq!(live.len(), LiveKey::ALL.len());
    }

    #[test]
    fn test_unknown_reward_stays_absent() {
        let live = LiveCache::new(CacheConfig::live());
        let mut unknown = snapshot(1, 100);
        unknown.block_reward = Provenance::Default(0);

        live.publish(Arc::new(unknown), Arc::new(Vec::new()));

        assert_eq!(live.block_reward(), None);
        assert_eq!(live.tip_height(), Some(100));
        assert_eq!(live.dashboard().unwrap().block_reward, Provenance::Default(0));
        assert_eq!(live.len(), LiveKey::ALL.len() - 1);
    }

    #[test]
    fn test_live_entries_expire_together() {
        let live = LiveCache::new(CacheConfig::live().with_ttl(Duration::from_millis(50)));
        live.publish(Arc::new(snapshot(1, 100)), Arc::new(Vec::new()));

        std::thread::sleep(Duration::from_millis(120));
        for key in LiveKey::ALL {
            assert!(live.get(key).is_none(), "{} should have expired", key.as_str());
        }
    }

    #[test]
    fn test_set_restarts_single_key_clock() {
        let live = LiveCache::new(CacheConfig::live().with_ttl(Duration::from_millis(150)));
        live.publish(Arc::new(snapshot(1, 100)), Arc::new(Vec::new()));

        std::thread::sleep(Duration::from_millis(100));
        live.set(LiveKey::TipHeight, LiveValue::TipHeight(101));
        std::thread::sleep(Duration::from_millis(100));

        assert!(live.dashboard().is_none());
        assert_eq!(live.tip_height(), Some(101));
    }

    #[test]
    fn test_live_key_round_trip_names() {
        for key in LiveKey::ALL {
            assert_eq!(LiveKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(LiveKey::parse("unknown"), None);
    }

    #[test]
    fn test_object_cache_keeps_kinds_apart() {
        let objects = ObjectCache::new(CacheConfig::immutable());
        let stored = objects.put_block(block(7, 1_700_000_000));
        objects.put_transaction(coinbase_tx("cb7", &[50]));

        assert_eq!(objects.block(&stored.hash).unwrap().height, 7);
        assert_eq!(objects.transaction("cb7").unwrap().total_output(), 50);
        assert!(objects.transaction(&stored.hash).is_none());
        assert!(objects.block("cb7").is_none());
    }

    #[test]
    fn test_object_cache_capacity_bound() {
        let objects = ObjectCache::new(CacheConfig::custom(3600, 2));
        objects.put_block(block(1, 1_700_000_000));
        objects.put_block(block(2, 1_700_000_600));
        objects.put_block(block(3, 1_700_001_200));

        assert_eq!(objects.len(), 2);
        assert!(objects.block(&block(1, 0).hash).is_none());
        assert_eq!(objects.metrics().evictions, 1);
    }
}
