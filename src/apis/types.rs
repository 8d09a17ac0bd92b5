/// Payloads returned by the indexing service
///
/// Field names follow the Esplora-style REST API. Unknown fields are ignored
/// so newer indexer versions keep decoding.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "id", alias = "hash")]
    pub hash: String,
    pub height: u64,
    /// Unix seconds
    pub timestamp: i64,
    pub tx_count: u64,
    /// Serialized size in bytes
    pub size: u64,
    #[serde(default)]
    pub weight: u64,
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default)]
    pub previousblockhash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub vout: Option<u32>,
    #[serde(default)]
    pub is_coinbase: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Smallest unit
    pub value: u64,
    #[serde(default)]
    pub scriptpubkey_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxStatus {
    pub confirmed: bool,
    #[serde(default)]
    pub block_height: Option<u64>,
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default)]
    pub block_time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub txid: String,
    #[serde(default)]
    pub vin: Vec<TxInput>,
    #[serde(default)]
    pub vout: Vec<TxOutput>,
    #[serde(default)]
    pub fee: Option<u64>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub status: TxStatus,
}

impl Transaction {
    /// First input carries the coinbase marker
    pub fn is_coinbase(&self) -> bool {
        self.vin.first().map(|input| input.is_coinbase).unwrap_or(false)
    }

    pub fn total_output(&self) -> u64 {
        self.vout.iter().map(|output| output.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MempoolTx {
    pub txid: String,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub vsize: u64,
    #[serde(default)]
    pub value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressStats {
    #[serde(default)]
    pub funded_txo_count: u64,
    #[serde(default)]
    pub funded_txo_sum: u64,
    #[serde(default)]
    pub spent_txo_count: u64,
    #[serde(default)]
    pub spent_txo_sum: u64,
    #[serde(default)]
    pub tx_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub address: String,
    #[serde(default)]
    pub chain_stats: AddressStats,
    #[serde(default)]
    pub mempool_stats: AddressStats,
}

impl AddressInfo {
    /// Confirmed plus unconfirmed balance; spent sums never exceed funded ones
    pub fn balance(&self) -> i64 {
        let funded = self.chain_stats.funded_txo_sum + self.mempool_stats.funded_txo_sum;
        let spent = self.chain_stats.spent_txo_sum + self.mempool_stats.spent_txo_sum;
        funded as i64 - spent as i64
    }
}

/// `/supply` answers either a bare number or an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SupplyInfo {
    Total(f64),
    Detailed {
        #[serde(alias = "total_amount", alias = "supply")]
        total: f64,
    },
}

impl SupplyInfo {
    pub fn total(&self) -> f64 {
        match self {
            SupplyInfo::Total(total) => *total,
            SupplyInfo::Detailed { total } => *total,
        }
    }
}
