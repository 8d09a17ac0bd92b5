//! The outward facade: one explicitly constructed instance owning both cache
//! tiers, the statistics store and the Update Manager.
//!
//! Request handlers only ever read from the caches and the store; the Update
//! Manager is the only writer of the live tier. Upstream errors from the
//! refresh loop never surface here, handlers see "has data" or "empty".
use crate::apis::{AddressInfo, Block, MempoolTx, Transaction, UpstreamClient};
use crate::cache::{CacheConfig, CacheMetrics, CachedObject, LiveCache, ObjectCache};
use crate::config::{resolve_database_path, validate, ExplorerConfig};
use crate::errors::ExplorerResult;
use crate::logger::{self, LogTag};
use crate::snapshot::DashboardSnapshot;
use crate::stats::{
    BlockHistoryRecord, DailyBlockSize, DailyStatsRecord, DailyTxCount, StatsStore, StatsSummary,
};
use crate::updater::{CycleOutcome, RefreshState, UpdateManager, UpdateMetrics};
use std::sync::Arc;

pub struct Explorer {
    upstream: Arc<dyn UpstreamClient>,
    live: Arc<LiveCache>,
    objects: Arc<ObjectCache>,
    stats: Arc<StatsStore>,
    updater: Arc<UpdateManager>,
}

impl Explorer {
    /// Validate the configuration and open the on-disk statistics store
    pub fn open(config: &ExplorerConfig, upstream: Arc<dyn UpstreamClient>) -> ExplorerResult<Self> {
        validate(config)?;
        let path = resolve_database_path(config);
        let stats = StatsStore::open(&path, config.stats.retention_days)?;
        Ok(Self::with_store(config, upstream, stats))
    }

    pub fn with_store(
        config: &ExplorerConfig,
        upstream: Arc<dyn UpstreamClient>,
        stats: StatsStore,
    ) -> Self {
        let live = Arc::new(LiveCache::new(CacheConfig::live_from(&config.cache)));
        let objects = Arc::new(ObjectCache::new(CacheConfig::immutable_from(&config.cache)));
        let stats = Arc::new(stats);
        let updater = Arc::new(UpdateManager::new(
            Arc::clone(&upstream),
            Arc::clone(&live),
            Arc::clone(&objects),
            Arc::clone(&stats),
            config.updater.clone(),
        ));

        Self {
            upstream,
            live,
            objects,
            stats,
            updater,
        }
    }

    /// Replace the Update Manager (custom intervals in tests and demos)
    pub fn with_updater(mut self, build: impl FnOnce(UpdateManager) -> UpdateManager) -> Self {
        let manager = UpdateManager::new(
            Arc::clone(&self.upstream),
            Arc::clone(&self.live),
            Arc::clone(&self.objects),
            Arc::clone(&self.stats),
            self.updater.config().clone(),
        );
        self.updater = Arc::new(build(manager));
        self
    }

    pub fn start(&self) {
        self.updater.start();
    }

    /// Stop the refresh timer; readers keep working on whatever is cached
    pub fn close(&self) {
        self.updater.stop();
        logger::info(LogTag::System, "Explorer closed");
    }

    pub fn updater(&self) -> &Arc<UpdateManager> {
        &self.updater
    }

    // ------------------------------------------------------------------
    // Live tier
    // ------------------------------------------------------------------

    pub fn dashboard(&self) -> Option<Arc<DashboardSnapshot>> {
        self.live.dashboard()
    }

    pub fn blocks(&self) -> Option<Arc<Vec<Block>>> {
        self.live.blocks()
    }

    pub fn tip_height(&self) -> Option<u64> {
        self.live.tip_height()
    }

    pub fn mempool(&self) -> Option<Arc<Vec<MempoolTx>>> {
        self.live.mempool()
    }

    pub fn block_reward(&self) -> Option<u64> {
        self.live.block_reward()
    }

    /// Cached dashboard, or force a refresh cycle on a miss
    pub async fn dashboard_or_refresh(&self) -> Option<Arc<DashboardSnapshot>> {
        if let Some(snapshot) = self.live.dashboard() {
            return Some(snapshot);
        }

        logger::debug(LogTag::Cache, "Dashboard miss, forcing refresh");
        match self.updater.force_refresh().await {
            CycleOutcome::Published(snapshot) => Some(snapshot),
            _ => self.live.dashboard(),
        }
    }

    /// Cached tip height, falling back to a direct upstream call
    pub async fn tip_height_or_fetch(&self) -> ExplorerResult<u64> {
        if let Some(height) = self.live.tip_height() {
            return Ok(height);
        }
        self.upstream.tip_height().await
    }

    // ------------------------------------------------------------------
    // Immutable tier
    // ------------------------------------------------------------------

    pub fn get_immutable(&self, key: &str) -> Option<CachedObject> {
        self.objects.get(key)
    }

    pub fn set_immutable(&self, key: impl Into<String>, value: CachedObject) {
        self.objects.set(key, value);
    }

    pub async fn block(&self, hash: &str) -> ExplorerResult<Arc<Block>> {
        if let Some(block) = self.objects.block(hash) {
            return Ok(block);
        }
        let block = self.upstream.block(hash).await?;
        Ok(self.objects.put_block(block))
    }

    /// Height to hash is resolved upstream each time (reorgs move it), the
    /// block itself comes from the immutable tier when present
    pub async fn block_at_height(&self, height: u64) -> ExplorerResult<Arc<Block>> {
        let hash = self.upstream.block_hash_at(height).await?;
        self.block(&hash).await
    }

    /// Only confirmed transactions are cached
    pub async fn transaction(&self, txid: &str) -> ExplorerResult<Arc<Transaction>> {
        if let Some(tx) = self.objects.transaction(txid) {
            return Ok(tx);
        }

        let tx = self.upstream.transaction(txid).await?;
        if tx.status.confirmed {
            Ok(self.objects.put_transaction(tx))
        } else {
            Ok(Arc::new(tx))
        }
    }

    /// Addresses change with every block, never cached
    pub async fn address(&self, address: &str) -> ExplorerResult<AddressInfo> {
        self.upstream.address(address).await
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    async fn with_stats<T, F>(&self, op: F) -> ExplorerResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&StatsStore) -> ExplorerResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.stats);
        tokio::task::spawn_blocking(move || op(&store)).await?
    }

    pub async fn daily_stats(&self, days: usize) -> ExplorerResult<Vec<DailyStatsRecord>> {
        self.with_stats(move |store| store.daily_stats(days)).await
    }

    pub async fn daily_tx_counts(&self, days: usize) -> ExplorerResult<Vec<DailyTxCount>> {
        self.with_stats(move |store| store.daily_tx_counts(days)).await
    }

    pub async fn daily_block_sizes(&self, days: usize) -> ExplorerResult<Vec<DailyBlockSize>> {
        self.with_stats(move |store| store.daily_block_sizes(days)).await
    }

    pub async fn block_history(&self, limit: usize) -> ExplorerResult<Vec<BlockHistoryRecord>> {
        self.with_stats(move |store| store.block_history(limit)).await
    }

    pub async fn stats_summary(&self) -> ExplorerResult<StatsSummary> {
        self.with_stats(|store| store.summary()).await
    }

    // ------------------------------------------------------------------
    // Refresh control and monitoring
    // ------------------------------------------------------------------

    pub fn is_fresh(&self) -> bool {
        self.updater.is_fresh()
    }

    /// Returns once the triggered (or already in-flight) cycle has settled
    pub async fn force_refresh(&self) -> CycleOutcome {
        self.updater.force_refresh().await
    }

    pub fn refresh_state(&self) -> RefreshState {
        self.updater.state()
    }

    pub fn update_metrics(&self) -> UpdateMetrics {
        self.updater.metrics()
    }

    pub fn live_cache_metrics(&self) -> CacheMetrics {
        self.live.metrics()
    }

    pub fn object_cache_metrics(&self) -> CacheMetrics {
        self.objects.metrics()
    }
}
