//! Update Manager: the single periodic job feeding the live cache
//!
//! Each cycle fans out the upstream calls, derives the aggregate metrics and
//! publishes one [`DashboardSnapshot`] into the live cache, then persists the
//! observed blocks as a best-effort side effect. A single-flight lock makes
//! sure no two cycles ever run at once: timer ticks that find a cycle in
//! flight are dropped, forced refreshes wait for it to settle.

pub mod derive;
pub mod state;

pub use state::{CycleOutcome, RefreshState, UpdateMetrics};

use self::state::{CycleGuard, StateCell};
use crate::apis::{Block, UpstreamClient};
use crate::cache::{LiveCache, ObjectCache};
use crate::config::UpdaterConfig;
use crate::errors::{ExplorerError, ExplorerResult};
use crate::logger::{self, LogTag};
use crate::snapshot::{DashboardSnapshot, Provenance};
use crate::stats::{BlockHistoryRecord, StatsStore};
use chrono::Utc;
use parking_lot::Mutex as SyncMutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct UpdateManager {
    upstream: Arc<dyn UpstreamClient>,
    live: Arc<LiveCache>,
    objects: Arc<ObjectCache>,
    stats: Arc<StatsStore>,
    config: UpdaterConfig,
    interval: Duration,

    cycle_lock: Mutex<()>,
    state: StateCell,
    /// Last known block reward, survives live-cache expiry
    sticky_reward: SyncMutex<Option<u64>>,
    last_success: SyncMutex<Option<Instant>>,
    metrics: SyncMutex<UpdateMetrics>,

    shutdown: Arc<Notify>,
    timer: SyncMutex<Option<JoinHandle<()>>>,
}

impl UpdateManager {
    pub fn new(
        upstream: Arc<dyn UpstreamClient>,
        live: Arc<LiveCache>,
        objects: Arc<ObjectCache>,
        stats: Arc<StatsStore>,
        config: UpdaterConfig,
    ) -> Self {
        let interval = Duration::from_secs(config.interval_secs);
        Self {
            upstream,
            live,
            objects,
            stats,
            config,
            interval,
            cycle_lock: Mutex::new(()),
            state: StateCell::new(),
            sticky_reward: SyncMutex::new(None),
            last_success: SyncMutex::new(None),
            metrics: SyncMutex::new(UpdateMetrics::default()),
            shutdown: Arc::new(Notify::new()),
            timer: SyncMutex::new(None),
        }
    }

    /// Override the refresh interval (sub-second intervals for tests and demos)
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> RefreshState {
        self.state.get()
    }

    pub fn metrics(&self) -> UpdateMetrics {
        self.metrics.lock().clone()
    }

    /// Age beyond which the live data counts as stale
    pub fn staleness_threshold(&self) -> Duration {
        self.interval * self.config.staleness_multiplier
    }

    /// True iff the last successful cycle is younger than the staleness threshold
    pub fn is_fresh(&self) -> bool {
        let last = *self.last_success.lock();
        last.map(|at| at.elapsed() < self.staleness_threshold())
            .unwrap_or(false)
    }

    pub fn last_success_age(&self) -> Option<Duration> {
        let last = *self.last_success.lock();
        last.map(|at| at.elapsed())
    }

    /// Spawn the periodic timer; the first cycle runs immediately
    pub fn start(self: &Arc<Self>) {
        let mut timer = self.timer.lock();
        if timer.is_some() || self.state() == RefreshState::Stopped {
            return;
        }

        let manager = Arc::clone(self);
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.interval;

        *timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown.notified() => {
                        logger::info(LogTag::Updater, "Update manager timer stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        // Each cycle runs in its own task so stop never waits on it
                        let cycle_manager = Arc::clone(&manager);
                        tokio::spawn(async move {
                            cycle_manager.run_scheduled_cycle().await;
                        });
                    }
                }
            }
        }));

        logger::info(
            LogTag::Updater,
            &format!("Update manager started (interval {:?})", interval),
        );
    }

    /// Halt the timer; an in-flight cycle is left to finish on its own
    pub fn stop(&self) {
        self.state.transition(RefreshState::Stopped);
        self.shutdown.notify_one();
        // Detach rather than abort, the loop exits on the notification
        drop(self.timer.lock().take());
    }

    /// Timer entry point: dropped when a cycle is already in flight
    pub async fn run_scheduled_cycle(&self) -> CycleOutcome {
        if self.state() == RefreshState::Stopped {
            return CycleOutcome::Stopped;
        }

        let Ok(lock) = self.cycle_lock.try_lock() else {
            self.metrics.lock().cycles_skipped += 1;
            logger::debug(LogTag::Updater, "Refresh already in flight, tick dropped");
            return CycleOutcome::Skipped;
        };

        let _cycle = CycleGuard::enter(lock, &self.state);
        self.run_cycle().await
    }

    /// Run one cycle now, or wait for the in-flight one to settle
    pub async fn force_refresh(&self) -> CycleOutcome {
        if self.state() == RefreshState::Stopped {
            return CycleOutcome::Stopped;
        }

        match self.cycle_lock.try_lock() {
            Ok(lock) => {
                let _cycle = CycleGuard::enter(lock, &self.state);
                self.run_cycle().await
            }
            Err(_) => {
                let _settled = self.cycle_lock.lock().await;
                CycleOutcome::Joined
            }
        }
    }

    async fn run_cycle(&self) -> CycleOutcome {
        let cycle = {
            let mut metrics = self.metrics.lock();
            metrics.cycles_started += 1;
            metrics.cycles_started
        };
        let started = Instant::now();

        let result = self.execute_cycle(cycle).await;

        let mut metrics = self.metrics.lock();
        metrics.last_cycle_duration = Some(started.elapsed());
        match result {
            Ok(snapshot) => {
                metrics.cycles_succeeded += 1;
                drop(metrics);
                logger::debug(
                    LogTag::Updater,
                    &format!(
                        "Cycle {} published tip {} in {:?}",
                        cycle,
                        snapshot.tip_height,
                        started.elapsed()
                    ),
                );
                CycleOutcome::Published(snapshot)
            }
            Err(e) => {
                metrics.cycles_failed += 1;
                metrics.last_error = Some(e.to_string());
                drop(metrics);
                logger::warning(
                    LogTag::Updater,
                    &format!("Cycle {} aborted, keeping previous snapshot: {}", cycle, e),
                );
                CycleOutcome::Failed(e)
            }
        }
    }

    async fn execute_cycle(&self, cycle: u64) -> ExplorerResult<Arc<DashboardSnapshot>> {
        let upstream = self.upstream.as_ref();
        let (blocks, tip_height, mempool, supply) = tokio::join!(
            upstream.recent_blocks(),
            upstream.tip_height(),
            upstream.mempool_recent(),
            upstream.supply()
        );

        // Required: abort the cycle
        let mut blocks = blocks?;
        let tip_height = tip_height?;
        blocks.sort_by(|a, b| b.height.cmp(&a.height));
        blocks.truncate(self.config.recent_blocks);

        // Optional: degrade to documented defaults
        let (mempool_txs, mempool_count) = match mempool {
            Ok(txs) => {
                let count = txs.len() as u64;
                (txs, Provenance::Fresh(count))
            }
            Err(e) => {
                log_degraded("mempool", &e);
                (Vec::new(), Provenance::Default(0))
            }
        };
        let supply = match supply {
            Ok(total) => Provenance::Fresh(total),
            Err(e) => {
                log_degraded("supply", &e);
                Provenance::Default(0.0)
            }
        };

        let avg_block_time = derive::avg_block_time(&blocks, self.config.default_block_time_secs);
        let difficulty = blocks.first().map(|b| b.difficulty).unwrap_or(0.0);
        let hashrate = derive::hashrate(difficulty, avg_block_time.value());
        let block_reward = self.resolve_block_reward(&blocks).await;

        let snapshot = Arc::new(DashboardSnapshot {
            cycle,
            tip_height,
            hashrate,
            avg_block_time,
            mempool_count,
            difficulty,
            supply,
            block_reward,
            blocks,
            updated_at: Utc::now(),
        });

        self.live.publish(Arc::clone(&snapshot), Arc::new(mempool_txs));
        *self.last_success.lock() = Some(Instant::now());

        if self.config.persist_history {
            self.persist_blocks(&snapshot.blocks).await;
        }

        Ok(snapshot)
    }

    /// Sticky: once known the reward is carried over instead of re-fetched,
    /// and a failed fetch never resets it
    async fn resolve_block_reward(&self, blocks: &[Block]) -> Provenance<u64> {
        let known = *self.sticky_reward.lock();
        if let Some(reward) = known {
            return Provenance::CarriedOver(reward);
        }

        let Some(newest) = blocks.first() else {
            return Provenance::Default(0);
        };

        match self.upstream.block_txs(&newest.hash).await {
            Ok(txs) => match txs.into_iter().next() {
                Some(tx) => match derive::coinbase_reward(&tx) {
                    Some(reward) => {
                        self.objects.put_transaction(tx);
                        *self.sticky_reward.lock() = Some(reward);
                        Provenance::Fresh(reward)
                    }
                    None => {
                        logger::debug(
                            LogTag::Updater,
                            &format!("First tx of block {} is not a coinbase", newest.height),
                        );
                        Provenance::Default(0)
                    }
                },
                None => Provenance::Default(0),
            },
            Err(e) => {
                log_degraded("block reward", &e);
                Provenance::Default(0)
            }
        }
    }

    /// Non-critical side effect: failures are logged and counted, never returned
    async fn persist_blocks(&self, blocks: &[Block]) {
        if blocks.is_empty() {
            return;
        }

        let records: Vec<BlockHistoryRecord> =
            blocks.iter().map(BlockHistoryRecord::from_block).collect();
        let store = Arc::clone(&self.stats);

        let outcome = match tokio::task::spawn_blocking(move || store.record_blocks(&records)).await
        {
            Ok(result) => result,
            Err(join_error) => Err(ExplorerError::from(join_error)),
        };

        let mut metrics = self.metrics.lock();
        match outcome {
            Ok(inserted) => {
                metrics.blocks_persisted += inserted as u64;
                drop(metrics);
                if inserted > 0 {
                    logger::debug(
                        LogTag::Stats,
                        &format!("Persisted {} new blocks to history", inserted),
                    );
                }
            }
            Err(e) => {
                metrics.persist_failures += 1;
                drop(metrics);
                logger::warning(LogTag::Stats, &format!("Block history write failed: {}", e));
            }
        }
    }
}

fn log_degraded(what: &str, error: &ExplorerError) {
    logger::warning(
        LogTag::Updater,
        &format!("{} unavailable, using default: {}", what, error),
    );
}
