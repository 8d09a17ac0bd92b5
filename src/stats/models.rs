use crate::apis::Block;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Date bucket format (UTC calendar day)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// UTC calendar day of a unix timestamp
pub fn date_bucket(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .format(DATE_FORMAT)
        .to_string()
}

/// One observed block; immutable once recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockHistoryRecord {
    pub height: u64,
    pub hash: String,
    pub timestamp: i64,
    pub tx_count: u64,
    pub size: u64,
    pub date: String,
}

impl BlockHistoryRecord {
    pub fn from_block(block: &Block) -> Self {
        Self {
            height: block.height,
            hash: block.hash.clone(),
            timestamp: block.timestamp,
            tx_count: block.tx_count,
            size: block.size,
            date: date_bucket(block.timestamp),
        }
    }
}

/// Per-day rollup, always recomputed in full from history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStatsRecord {
    pub date: String,
    pub tx_count: u64,
    pub block_count: u64,
    pub total_size: u64,
    pub avg_block_size: f64,
    /// Unix seconds of the last recompute
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTxCount {
    pub date: String,
    pub tx_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBlockSize {
    pub date: String,
    pub avg_block_size: f64,
}

impl From<&DailyStatsRecord> for DailyTxCount {
    fn from(record: &DailyStatsRecord) -> Self {
        Self {
            date: record.date.clone(),
            tx_count: record.tx_count,
        }
    }
}

impl From<&DailyStatsRecord> for DailyBlockSize {
    fn from(record: &DailyStatsRecord) -> Self {
        Self {
            date: record.date.clone(),
            avg_block_size: record.avg_block_size,
        }
    }
}

/// Overview of what the store currently holds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub blocks_recorded: u64,
    pub days_recorded: u64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub highest_block: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionReport {
    pub history_deleted: usize,
    pub daily_deleted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_bucket_is_utc_day() {
        // 2023-11-14 22:13:20 UTC
        assert_eq!(date_bucket(1_700_000_000), "2023-11-14");
        assert_eq!(date_bucket(0), "1970-01-01");
    }
}
