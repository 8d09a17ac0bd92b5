/// Configuration schemas, each defined once with its defaults
use crate::config_struct;

// ============================================================================
// UPSTREAM
// ============================================================================

config_struct! {
    /// Indexing service connection
    pub struct UpstreamConfig {
        /// Base URL of the indexing service API
        base_url: String = "https://blockstream.info/api".to_string(),
        /// Per-request timeout
        timeout_secs: u64 = 10,
        /// Client-side request budget, 0 disables the limiter
        max_requests_per_minute: usize = 0,
    }
}

// ============================================================================
// CACHE TIERS
// ============================================================================

config_struct! {
    /// Live and immutable cache tiers
    pub struct CacheSettings {
        /// Safety net in case the refresh loop stalls
        live_ttl_secs: u64 = 60,
        live_capacity: usize = 16,
        /// Blocks and transactions never change once they exist
        immutable_ttl_secs: u64 = 3600,
        immutable_capacity: usize = 1000,
    }
}

// ============================================================================
// UPDATE MANAGER
// ============================================================================

config_struct! {
    /// Periodic refresh loop
    pub struct UpdaterConfig {
        interval_secs: u64 = 30,
        /// `is_fresh()` turns false after `interval * staleness_multiplier`
        staleness_multiplier: u32 = 3,
        /// Number of recent blocks kept in the snapshot
        recent_blocks: usize = 15,
        /// Used for avg block time when fewer than two blocks are known
        default_block_time_secs: f64 = 120.0,
        /// Persist observed blocks to the statistics store
        persist_history: bool = true,
    }
}

// ============================================================================
// STATISTICS STORE
// ============================================================================

config_struct! {
    /// Durable block history and daily rollups
    pub struct StatsConfig {
        /// SQLite file, empty means `<data dir>/blockview/stats.db`
        database_path: String = String::new(),
        retention_days: u32 = 90,
    }
}

// ============================================================================
// LOGGING
// ============================================================================

config_struct! {
    pub struct LoggingConfig {
        level: String = "info".to_string(),
        /// Tags with debug output enabled (system, upstream, cache, updater, stats)
        debug_tags: Vec<String> = Vec::new(),
        verbose: bool = false,
    }
}

config_struct! {
    /// Root configuration
    pub struct ExplorerConfig {
        upstream: UpstreamConfig = UpstreamConfig::default(),
        cache: CacheSettings = CacheSettings::default(),
        updater: UpdaterConfig = UpdaterConfig::default(),
        stats: StatsConfig = StatsConfig::default(),
        logging: LoggingConfig = LoggingConfig::default(),
    }
}
