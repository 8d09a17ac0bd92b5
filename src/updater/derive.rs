/// Aggregate metrics derived from one cycle's upstream payloads
use crate::apis::{Block, Transaction};
use crate::snapshot::Provenance;

/// 2^32, expected hashes per unit of difficulty
pub const HASHES_PER_DIFFICULTY: f64 = 4_294_967_296.0;

/// Average spacing of a newest-first block window
///
/// `(timestamp of newest - timestamp of oldest) / (count - 1)` with at least
/// two blocks. Fewer blocks, or a window whose timestamps do not advance,
/// yields the configured default.
pub fn avg_block_time(blocks: &[Block], default_secs: f64) -> Provenance<f64> {
    if blocks.len() < 2 {
        return Provenance::Default(default_secs);
    }

    let newest = &blocks[0];
    let oldest = &blocks[blocks.len() - 1];
    let span = (newest.timestamp - oldest.timestamp) as f64;
    if span <= 0.0 {
        return Provenance::Default(default_secs);
    }

    Provenance::Fresh(span / (blocks.len() - 1) as f64)
}

/// Proof-of-work hashrate estimate: `difficulty * 2^32 / avg_block_time`
pub fn hashrate(difficulty: f64, avg_block_time: f64) -> f64 {
    if avg_block_time <= 0.0 {
        return 0.0;
    }
    difficulty * HASHES_PER_DIFFICULTY / avg_block_time
}

/// Block reward paid by a coinbase transaction, None for anything else
pub fn coinbase_reward(tx: &Transaction) -> Option<u64> {
    if tx.is_coinbase() {
        Some(tx.total_output())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{block, chain, coinbase_tx};

    #[test]
    fn test_hashrate_formula() {
        let expected = 1000.0 * 2f64.powi(32) / 120.0;
        let actual = hashrate(1000.0, 120.0);
        assert!((actual - expected).abs() < 1e-6 * expected);
        assert_eq!(hashrate(1000.0, 0.0), 0.0);
    }

    #[test]
    fn test_avg_block_time_over_window() {
        let blocks = chain(115, 15, 600);
        let avg = avg_block_time(&blocks, 120.0);
        assert_eq!(avg, Provenance::Fresh(600.0));
    }

    #[test]
    fn test_avg_block_time_uneven_spacing() {
        // newest first: 1300, 1000, 100 -> (1300 - 100) / 2
        let blocks = vec![block(3, 1300), block(2, 1000), block(1, 100)];
        assert_eq!(avg_block_time(&blocks, 120.0), Provenance::Fresh(600.0));
    }

    #[test]
    fn test_avg_block_time_falls_back() {
        assert_eq!(avg_block_time(&[], 120.0), Provenance::Default(120.0));
        assert_eq!(avg_block_time(&[block(1, 100)], 120.0), Provenance::Default(120.0));
        let same_second = vec![block(2, 100), block(1, 100)];
        assert_eq!(avg_block_time(&same_second, 120.0), Provenance::Default(120.0));
    }

    #[test]
    fn test_coinbase_reward_sums_outputs() {
        let tx = coinbase_tx("cb", &[4_000_000_000, 1_000_000_000]);
        assert_eq!(coinbase_reward(&tx), Some(5_000_000_000));

        let mut spend = coinbase_tx("spend", &[10]);
        spend.vin[0].is_coinbase = false;
        assert_eq!(coinbase_reward(&spend), None);
    }
}
