/// SQLite-backed block history and daily rollups
use super::models::{
    BlockHistoryRecord, DailyBlockSize, DailyStatsRecord, DailyTxCount, RetentionReport,
    StatsSummary, DATE_FORMAT,
};
use crate::errors::ExplorerResult;
use crate::logger::{self, LogTag};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::collections::BTreeSet;
use std::path::Path;

pub struct StatsStore {
    conn: Mutex<Connection>,
    retention_days: u32,
}

impl StatsStore {
    /// Open (or create) the database, then sweep rows older than the retention window
    pub fn open(path: impl AsRef<Path>, retention_days: u32) -> ExplorerResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self::from_connection(conn, retention_days)?;
        logger::info(
            LogTag::Stats,
            &format!("Statistics store opened at {}", path.display()),
        );
        Ok(store)
    }

    pub fn open_in_memory(retention_days: u32) -> ExplorerResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, retention_days)
    }

    fn from_connection(conn: Connection, retention_days: u32) -> ExplorerResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
            retention_days,
        };
        store.create_tables()?;

        let report = store.apply_retention(Utc::now())?;
        if report.history_deleted > 0 || report.daily_deleted > 0 {
            logger::info(
                LogTag::Stats,
                &format!(
                    "Retention sweep removed {} history rows and {} daily rows older than {} days",
                    report.history_deleted, report.daily_deleted, retention_days
                ),
            );
        }
        Ok(store)
    }

    fn create_tables(&self) -> ExplorerResult<()> {
        let conn = self.conn.lock();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS blocks_history (
                height INTEGER PRIMARY KEY,
                hash TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                tx_count INTEGER NOT NULL,
                size INTEGER NOT NULL,
                date TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS daily_stats (
                date TEXT PRIMARY KEY,
                tx_count INTEGER NOT NULL,
                block_count INTEGER NOT NULL,
                total_size INTEGER NOT NULL,
                avg_block_size REAL NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_blocks_history_date ON blocks_history(date)",
            [],
        )?;

        Ok(())
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Delete history and daily rows whose date falls before `now - retention_days`
    ///
    /// The window is measured in whole UTC days: rows are kept or dropped by
    /// their date bucket, so a row just past the exact cutoff instant
    /// survives until its day falls out of the window.
    pub fn apply_retention(&self, now: DateTime<Utc>) -> ExplorerResult<RetentionReport> {
        let cutoff = (now - chrono::Duration::days(self.retention_days as i64))
            .format(DATE_FORMAT)
            .to_string();

        let conn = self.conn.lock();
        let history_deleted =
            conn.execute("DELETE FROM blocks_history WHERE date < ?1", params![cutoff])?;
        let daily_deleted =
            conn.execute("DELETE FROM daily_stats WHERE date < ?1", params![cutoff])?;

        Ok(RetentionReport {
            history_deleted,
            daily_deleted,
        })
    }

    /// Insert new history rows (existing heights are left untouched), then
    /// recompute the daily rollup for every date in the batch.
    ///
    /// Returns the number of rows actually inserted.
    pub fn record_blocks(&self, records: &[BlockHistoryRecord]) -> ExplorerResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO blocks_history
                (height, hash, timestamp, tx_count, size, date)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for record in records {
                inserted += stmt.execute(params![
                    record.height as i64,
                    record.hash,
                    record.timestamp,
                    record.tx_count as i64,
                    record.size as i64,
                    record.date
                ])?;
            }
        }

        let dates: BTreeSet<&str> = records.iter().map(|r| r.date.as_str()).collect();
        let now = Utc::now().timestamp();
        for date in dates {
            Self::recompute_daily(&tx, date, now)?;
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn recompute_daily(tx: &Transaction, date: &str, now: i64) -> ExplorerResult<()> {
        let (block_count, tx_count, total_size): (i64, i64, i64) = tx.query_row(
            "SELECT COUNT(*), COALESCE(SUM(tx_count), 0), COALESCE(SUM(size), 0)
             FROM blocks_history WHERE date = ?1",
            params![date],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        // Retention may have emptied the bucket
        if block_count == 0 {
            tx.execute("DELETE FROM daily_stats WHERE date = ?1", params![date])?;
            return Ok(());
        }

        let avg_block_size = total_size as f64 / block_count as f64;
        tx.execute(
            "INSERT OR REPLACE INTO daily_stats
            (date, tx_count, block_count, total_size, avg_block_size, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![date, tx_count, block_count, total_size, avg_block_size, now],
        )?;
        Ok(())
    }

    /// Most recent `days` days with data, oldest first
    pub fn daily_stats(&self, days: usize) -> ExplorerResult<Vec<DailyStatsRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT date, tx_count, block_count, total_size, avg_block_size, updated_at
             FROM daily_stats ORDER BY date DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![days as i64], row_to_daily)?;
        let mut records = rows.collect::<Result<Vec<_>, _>>()?;
        records.reverse();
        Ok(records)
    }

    pub fn daily_tx_counts(&self, days: usize) -> ExplorerResult<Vec<DailyTxCount>> {
        Ok(self.daily_stats(days)?.iter().map(DailyTxCount::from).collect())
    }

    pub fn daily_block_sizes(&self, days: usize) -> ExplorerResult<Vec<DailyBlockSize>> {
        Ok(self.daily_stats(days)?.iter().map(DailyBlockSize::from).collect())
    }

    /// Per-block history, newest first
    pub fn block_history(&self, limit: usize) -> ExplorerResult<Vec<BlockHistoryRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT height, hash, timestamp, tx_count, size, date
             FROM blocks_history ORDER BY height DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], row_to_history)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn history_record(&self, height: u64) -> ExplorerResult<Option<BlockHistoryRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                "SELECT height, hash, timestamp, tx_count, size, date
                 FROM blocks_history WHERE height = ?1",
                params![height as i64],
                row_to_history,
            )
            .optional()?;
        Ok(record)
    }

    pub fn summary(&self) -> ExplorerResult<StatsSummary> {
        let conn = self.conn.lock();

        let (blocks_recorded, highest_block): (i64, Option<i64>) = conn.query_row(
            "SELECT COUNT(*), MAX(height) FROM blocks_history",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (days_recorded, first_date, last_date): (i64, Option<String>, Option<String>) = conn
            .query_row(
                "SELECT COUNT(*), MIN(date), MAX(date) FROM daily_stats",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

        Ok(StatsSummary {
            blocks_recorded: blocks_recorded as u64,
            days_recorded: days_recorded as u64,
            first_date,
            last_date,
            highest_block: highest_block.map(|h| h as u64),
        })
    }

    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> ExplorerResult<()> {
        self.conn.lock().execute_batch(sql)?;
        Ok(())
    }
}

fn row_to_history(row: &Row) -> rusqlite::Result<BlockHistoryRecord> {
    Ok(BlockHistoryRecord {
        height: row.get::<_, i64>(0)? as u64,
        hash: row.get(1)?,
        timestamp: row.get(2)?,
        tx_count: row.get::<_, i64>(3)? as u64,
        size: row.get::<_, i64>(4)? as u64,
        date: row.get(5)?,
    })
}

fn row_to_daily(row: &Row) -> rusqlite::Result<DailyStatsRecord> {
    Ok(DailyStatsRecord {
        date: row.get(0)?,
        tx_count: row.get::<_, i64>(1)? as u64,
        block_count: row.get::<_, i64>(2)? as u64,
        total_size: row.get::<_, i64>(3)? as u64,
        avg_block_size: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::models::date_bucket;
    use chrono::Duration;

    fn record(height: u64, timestamp: i64, tx_count: u64, size: u64) -> BlockHistoryRecord {
        BlockHistoryRecord {
            height,
            hash: format!("hash-{}", height),
            timestamp,
            tx_count,
            size,
            date: date_bucket(timestamp),
        }
    }

    /// Noon UTC `days` days ago, so small offsets stay inside the same bucket
    fn days_ago(days: i64) -> i64 {
        (Utc::now().date_naive() - Duration::days(days))
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp()
    }

    #[test]
    fn test_daily_rollup_sums_bucket() {
        let store = StatsStore::open_in_memory(90).unwrap();
        let ts = days_ago(1);

        let inserted = store
            .record_blocks(&[record(100, ts, 5, 1000), record(101, ts + 60, 3, 2000)])
            .unwrap();
        assert_eq!(inserted, 2);

        let daily = store.daily_stats(7).unwrap();
        assert_eq!(daily.len(), 1);
        let day = &daily[0];
        assert_eq!(day.date, date_bucket(ts));
        assert_eq!(day.block_count, 2);
        assert_eq!(day.tx_count, 8);
        assert_eq!(day.total_size, 3000);
        assert_eq!(day.avg_block_size, 1500.0);
    }

    #[test]
    fn test_duplicate_height_is_ignored() {
        let store = StatsStore::open_in_memory(90).unwrap();
        let ts = days_ago(2);
        let original = record(100, ts, 5, 1000);

        assert_eq!(store.record_blocks(&[original.clone()]).unwrap(), 1);

        let mut rewritten = original.clone();
        rewritten.hash = "other".to_string();
        rewritten.size = 9999;
        assert_eq!(store.record_blocks(&[rewritten]).unwrap(), 0);
        assert_eq!(store.record_blocks(&[original.clone()]).unwrap(), 0);

        assert_eq!(store.history_record(100).unwrap(), Some(original));
        assert_eq!(store.summary().unwrap().blocks_recorded, 1);
        assert_eq!(store.daily_stats(1).unwrap()[0].total_size, 1000);
    }

    #[test]
    fn test_rollup_recomputed_when_day_grows() {
        let store = StatsStore::open_in_memory(90).unwrap();
        let ts = days_ago(3);

        store.record_blocks(&[record(10, ts, 2, 400)]).unwrap();
        store.record_blocks(&[record(11, ts + 600, 4, 800)]).unwrap();

        let day = &store.daily_stats(1).unwrap()[0];
        assert_eq!(day.block_count, 2);
        assert_eq!(day.tx_count, 6);
        assert_eq!(day.avg_block_size, 600.0);
    }

    #[test]
    fn test_daily_stats_oldest_first_and_limited() {
        let store = StatsStore::open_in_memory(90).unwrap();
        let records: Vec<_> = (0..5)
            .map(|i| record(200 + i as u64, days_ago(5 - i), 1 + i as u64, 100))
            .collect();
        store.record_blocks(&records).unwrap();

        let last_three = store.daily_stats(3).unwrap();
        assert_eq!(last_three.len(), 3);
        assert!(last_three[0].date < last_three[1].date);
        assert!(last_three[1].date < last_three[2].date);
        assert_eq!(last_three[2].date, date_bucket(days_ago(1)));

        // Fewer days available than requested
        assert_eq!(store.daily_stats(30).unwrap().len(), 5);

        let counts = store.daily_tx_counts(3).unwrap();
        assert_eq!(counts.iter().map(|c| c.tx_count).collect::<Vec<_>>(), vec![3, 4, 5]);
        let sizes = store.daily_block_sizes(3).unwrap();
        assert!(sizes.iter().all(|s| s.avg_block_size == 100.0));
    }

    #[test]
    fn test_retention_sweep_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stats.db");

        {
            let store = StatsStore::open(&path, 90).unwrap();
            store
                .record_blocks(&[record(1, days_ago(91), 1, 100), record(2, days_ago(89), 1, 100)])
                .unwrap();
            assert_eq!(store.summary().unwrap().blocks_recorded, 2);
        }

        let reopened = StatsStore::open(&path, 90).unwrap();
        assert_eq!(reopened.history_record(1).unwrap(), None);
        assert!(reopened.history_record(2).unwrap().is_some());

        let daily = reopened.daily_stats(10).unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].date, date_bucket(days_ago(89)));
    }

    #[test]
    fn test_retention_counts_whole_days() {
        let store = StatsStore::open_in_memory(90).unwrap();
        let now = "2026-06-10T23:30:00Z".parse::<DateTime<Utc>>().unwrap();
        // 90 days 23 hours earlier, but on the cutoff day itself
        let edge = "2026-03-12T00:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let expired = "2026-03-11T23:59:00Z".parse::<DateTime<Utc>>().unwrap();

        store
            .record_blocks(&[
                record(1, expired.timestamp(), 1, 100),
                record(2, edge.timestamp(), 1, 100),
            ])
            .unwrap();

        let report = store.apply_retention(now).unwrap();
        assert_eq!(report.history_deleted, 1);
        assert_eq!(report.daily_deleted, 1);
        assert!(store.history_record(1).unwrap().is_none());
        assert!(store.history_record(2).unwrap().is_some());
    }

    #[test]
    fn test_block_history_newest_first() {
        let store = StatsStore::open_in_memory(90).unwrap();
        let ts = days_ago(1);
        store
            .record_blocks(&[record(5, ts, 1, 10), record(7, ts, 1, 10), record(6, ts, 1, 10)])
            .unwrap();

        let heights: Vec<u64> = store.block_history(2).unwrap().iter().map(|r| r.height).collect();
        assert_eq!(heights, vec![7, 6]);

        let summary = store.summary().unwrap();
        assert_eq!(summary.highest_block, Some(7));
        assert_eq!(summary.days_recorded, 1);
        assert_eq!(summary.first_date, summary.last_date);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let store = StatsStore::open_in_memory(90).unwrap();
        assert_eq!(store.record_blocks(&[]).unwrap(), 0);
        assert_eq!(store.summary().unwrap(), StatsSummary::default());
    }
}
