//! Blockview: caching and background-refresh core for a blockchain explorer
//!
//! One [`explorer::Explorer`] owns a short-lived live cache fed by a
//! single-flight Update Manager, an immutable object cache for blocks and
//! transactions, and a SQLite statistics store with retention.

pub mod apis;
pub mod arguments;
pub mod cache;
pub mod config;
pub mod errors;
pub mod explorer;
pub mod logger;
pub mod snapshot;
pub mod stats;
pub mod updater;

#[cfg(test)]
mod testing;

pub use errors::{ExplorerError, ExplorerResult};
pub use explorer::Explorer;
