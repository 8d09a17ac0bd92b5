//! Upstream indexing service: payload types, the client trait and its HTTP implementation

pub mod client;
pub mod types;
pub mod upstream;

pub use client::{HttpUpstream, RateLimiter, UpstreamStats};
pub use types::{AddressInfo, Block, MempoolTx, Transaction, TxInput, TxOutput, TxStatus};
pub use upstream::{paths, UpstreamClient};
