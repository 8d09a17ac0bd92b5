/// Upstream indexing service boundary
///
/// Implementors only provide `request`, a single request/response call that
/// returns the parsed JSON body. Typed accessors decode on top of it. No
/// caching and no retries happen at this layer.
use super::types::{AddressInfo, Block, MempoolTx, SupplyInfo, Transaction};
use crate::errors::{ExplorerError, ExplorerResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Endpoint paths relative to the service base URL
pub mod paths {
    pub const BLOCKS: &str = "/blocks";
    pub const TIP_HEIGHT: &str = "/blocks/tip/height";
    pub const MEMPOOL_RECENT: &str = "/mempool/recent";
    pub const SUPPLY: &str = "/supply";

    pub fn block(hash: &str) -> String {
        format!("/block/{}", hash)
    }

    pub fn block_txs(hash: &str) -> String {
        format!("/block/{}/txs", hash)
    }

    pub fn block_height(height: u64) -> String {
        format!("/block-height/{}", height)
    }

    pub fn transaction(txid: &str) -> String {
        format!("/tx/{}", txid)
    }

    pub fn address(address: &str) -> String {
        format!("/address/{}", address)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(path: &str, value: Value) -> ExplorerResult<T> {
    serde_json::from_value(value).map_err(|e| ExplorerError::decode(path, e.to_string()))
}

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetch `path` and return the parsed body
    async fn request(&self, path: &str) -> ExplorerResult<Value>;

    /// Most recent blocks, newest first
    async fn recent_blocks(&self) -> ExplorerResult<Vec<Block>> {
        decode(paths::BLOCKS, self.request(paths::BLOCKS).await?)
    }

    async fn tip_height(&self) -> ExplorerResult<u64> {
        decode(paths::TIP_HEIGHT, self.request(paths::TIP_HEIGHT).await?)
    }

    async fn mempool_recent(&self) -> ExplorerResult<Vec<MempoolTx>> {
        decode(paths::MEMPOOL_RECENT, self.request(paths::MEMPOOL_RECENT).await?)
    }

    async fn supply(&self) -> ExplorerResult<f64> {
        let info: SupplyInfo = decode(paths::SUPPLY, self.request(paths::SUPPLY).await?)?;
        Ok(info.total())
    }

    async fn block(&self, hash: &str) -> ExplorerResult<Block> {
        let path = paths::block(hash);
        let value = self.request(&path).await?;
        decode(&path, value)
    }

    /// Hash of the block at `height`
    async fn block_hash_at(&self, height: u64) -> ExplorerResult<String> {
        let path = paths::block_height(height);
        let value = self.request(&path).await?;
        decode(&path, value)
    }

    async fn block_txs(&self, hash: &str) -> ExplorerResult<Vec<Transaction>> {
        let path = paths::block_txs(hash);
        let value = self.request(&path).await?;
        decode(&path, value)
    }

    async fn transaction(&self, txid: &str) -> ExplorerResult<Transaction> {
        let path = paths::transaction(txid);
        let value = self.request(&path).await?;
        decode(&path, value)
    }

    async fn address(&self, address: &str) -> ExplorerResult<AddressInfo> {
        let path = paths::address(address);
        let value = self.request(&path).await?;
        decode(&path, value)
    }
}
