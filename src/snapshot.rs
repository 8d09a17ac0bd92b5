/// Live dashboard aggregate and per-field provenance
use crate::apis::Block;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a derived field holds its value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum Provenance<T> {
    /// Derived from data fetched in this cycle
    Fresh(T),
    /// Kept from an earlier cycle because this one could not re-derive it
    CarriedOver(T),
    /// Documented fallback, nothing better was available
    Default(T),
}

impl<T: Copy> Provenance<T> {
    pub fn value(&self) -> T {
        match self {
            Provenance::Fresh(value) | Provenance::CarriedOver(value) | Provenance::Default(value) => {
                *value
            }
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Provenance::Fresh(_))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Provenance::Default(_))
    }
}

/// The single authoritative live aggregate
///
/// Published as one `Arc` and never mutated afterwards, so a reader always
/// sees every field from the same refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Refresh cycle that produced this snapshot
    pub cycle: u64,
    pub tip_height: u64,
    /// `difficulty * 2^32 / avg_block_time`
    pub hashrate: f64,
    /// Seconds
    pub avg_block_time: Provenance<f64>,
    pub mempool_count: Provenance<u64>,
    pub difficulty: f64,
    pub supply: Provenance<f64>,
    /// Smallest unit, sticky across cycles that fail to re-derive it
    pub block_reward: Provenance<u64>,
    /// Newest first
    pub blocks: Vec<Block>,
    pub updated_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    pub fn newest_block(&self) -> Option<&Block> {
        self.blocks.first()
    }

    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.updated_at
    }
}
