//! Durable block history and per-day rollups
//!
//! Layout:
//! - `blocks_history(height PK, hash, timestamp, tx_count, size, date)`
//! - `daily_stats(date PK, tx_count, block_count, total_size, avg_block_size, updated_at)`
//! - index on `blocks_history(date)` for rollup queries
//!
//! Retention is a one-shot sweep when the store is opened.

pub mod models;
pub mod store;

pub use models::{
    date_bucket, BlockHistoryRecord, DailyBlockSize, DailyStatsRecord, DailyTxCount,
    RetentionReport, StatsSummary,
};
pub use store::StatsStore;
