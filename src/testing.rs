//! Test fixtures: an in-memory upstream and payload builders
use crate::apis::{paths, Block, Transaction, TxInput, TxOutput, TxStatus, UpstreamClient};
use crate::errors::{ExplorerError, ExplorerResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

pub fn block_hash(height: u64) -> String {
    format!("{:064x}", height)
}

pub fn block(height: u64, timestamp: i64) -> Block {
    Block {
        hash: block_hash(height),
        height,
        timestamp,
        tx_count: 1,
        size: 1_000,
        weight: 4_000,
        difficulty: 1_000.0,
        previousblockhash: height.checked_sub(1).map(block_hash),
    }
}

/// `count` blocks ending at `tip`, newest first, `spacing` seconds apart
pub fn chain(tip: u64, count: u64, spacing: i64) -> Vec<Block> {
    let base = 1_700_000_000i64;
    (0..count)
        .map(|i| {
            let height = tip - i;
            block(height, base + height as i64 * spacing)
        })
        .collect()
}

pub fn coinbase_tx(txid: &str, outputs: &[u64]) -> Transaction {
    Transaction {
        txid: txid.to_string(),
        vin: vec![TxInput {
            txid: None,
            vout: None,
            is_coinbase: true,
        }],
        vout: outputs
            .iter()
            .map(|value| TxOutput {
                value: *value,
                scriptpubkey_address: None,
            })
            .collect(),
        fee: None,
        size: 250,
        status: TxStatus {
            confirmed: true,
            ..TxStatus::default()
        },
    }
}

/// Canned responses per path with failure and latency injection
#[derive(Default)]
pub struct MockUpstream {
    responses: Mutex<HashMap<String, Value>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Mutex<Option<Duration>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// A healthy chain: blocks, tip, mempool, supply and a coinbase paying `reward`
    pub fn with_chain(blocks: &[Block], reward: u64) -> Self {
        let mock = Self::new();
        mock.set_chain(blocks, reward);
        mock.respond(paths::MEMPOOL_RECENT, json!([
            { "txid": "m1", "fee": 200, "vsize": 140, "value": 10_000 },
            { "txid": "m2", "fee": 300, "vsize": 180, "value": 20_000 }
        ]));
        mock.respond(paths::SUPPLY, json!(19_700_000.0));
        mock
    }

    pub fn set_chain(&self, blocks: &[Block], reward: u64) {
        self.respond(paths::BLOCKS, serde_json::to_value(blocks).unwrap());
        if let Some(newest) = blocks.first() {
            self.respond(paths::TIP_HEIGHT, json!(newest.height));
            let coinbase = coinbase_tx(&format!("cb-{}", newest.height), &[reward]);
            self.respond(&paths::block_txs(&newest.hash), json!([coinbase]));
            for block in blocks {
                self.respond(&paths::block(&block.hash), serde_json::to_value(block).unwrap());
                self.respond(&paths::block_height(block.height), json!(block.hash));
            }
        }
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.responses.lock().insert(path.to_string(), body);
    }

    pub fn fail(&self, path: &str) {
        self.failing.lock().insert(path.to_string());
    }

    pub fn recover(&self, path: &str) {
        self.failing.lock().remove(path);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl UpstreamClient for MockUpstream {
    async fn request(&self, path: &str) -> ExplorerResult<Value> {
        *self.calls.lock().entry(path.to_string()).or_insert(0) += 1;

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().contains(path) {
            return Err(ExplorerError::upstream(path, "injected failure"));
        }

        let response = self.responses.lock().get(path).cloned();
        response.ok_or(ExplorerError::UpstreamStatus {
            path: path.to_string(),
            status: 404,
        })
    }
}
