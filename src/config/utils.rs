/// Configuration loading and validation
use super::schemas::{
    CacheSettings, ExplorerConfig, LoggingConfig, StatsConfig, UpdaterConfig, UpstreamConfig,
};
use crate::cache::LiveKey;
use crate::errors::{ExplorerError, ExplorerResult};
use crate::logger::{self, LogTag};
use std::path::{Path, PathBuf};

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "blockview.toml";

/// Load configuration from a TOML file
///
/// A missing file is not an error: defaults are used and a warning is logged.
pub fn load_config(path: impl AsRef<Path>) -> ExplorerResult<ExplorerConfig> {
    let path = path.as_ref();
    let config = if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        parse_config(&contents)?
    } else {
        logger::warning(
            LogTag::Config,
            &format!("Config file {} not found, using defaults", path.display()),
        );
        ExplorerConfig::default()
    };

    validate(&config)?;
    Ok(config)
}

/// Parse TOML, warning about keys no section accepts (usually typos that
/// would otherwise silently fall back to defaults)
pub fn parse_config(contents: &str) -> ExplorerResult<ExplorerConfig> {
    let config = toml::from_str::<ExplorerConfig>(contents)
        .map_err(|e| ExplorerError::Config(format!("Failed to parse config: {}", e)))?;

    for key in unknown_keys(contents)? {
        logger::warning(LogTag::Config, &format!("Ignoring unknown config key {}", key));
    }
    Ok(config)
}

fn section_fields(section: &str) -> Option<&'static [&'static str]> {
    match section {
        "upstream" => Some(UpstreamConfig::FIELDS),
        "cache" => Some(CacheSettings::FIELDS),
        "updater" => Some(UpdaterConfig::FIELDS),
        "stats" => Some(StatsConfig::FIELDS),
        "logging" => Some(LoggingConfig::FIELDS),
        _ => None,
    }
}

/// Dotted paths of keys that do not map to any configuration field
pub fn unknown_keys(contents: &str) -> ExplorerResult<Vec<String>> {
    let table = contents
        .parse::<toml::Table>()
        .map_err(|e| ExplorerError::Config(format!("Failed to parse config: {}", e)))?;

    let mut unknown = Vec::new();
    for (section, value) in &table {
        let Some(fields) = section_fields(section) else {
            unknown.push(section.clone());
            continue;
        };
        if let Some(entries) = value.as_table() {
            unknown.extend(
                entries
                    .keys()
                    .filter(|key| !fields.contains(&key.as_str()))
                    .map(|key| format!("{}.{}", section, key)),
            );
        }
    }
    Ok(unknown)
}

pub fn validate(config: &ExplorerConfig) -> ExplorerResult<()> {
    if config.upstream.base_url.trim().is_empty() {
        return Err(ExplorerError::Config("upstream.base_url must not be empty".into()));
    }
    if config.updater.interval_secs == 0 {
        return Err(ExplorerError::Config("updater.interval_secs must be positive".into()));
    }
    // Freshness must tolerate at least one missed cycle
    if config.updater.staleness_multiplier <= 1 {
        return Err(ExplorerError::Config(
            "updater.staleness_multiplier must be greater than 1".into(),
        ));
    }
    if config.updater.recent_blocks == 0 {
        return Err(ExplorerError::Config("updater.recent_blocks must be positive".into()));
    }
    if config.updater.default_block_time_secs <= 0.0 {
        return Err(ExplorerError::Config(
            "updater.default_block_time_secs must be positive".into(),
        ));
    }
    if config.cache.live_capacity == 0 || config.cache.immutable_capacity == 0 {
        return Err(ExplorerError::Config("cache capacities must be positive".into()));
    }
    // A publish writes every live key at once and must not evict its own entries
    if config.cache.live_capacity < LiveKey::ALL.len() {
        return Err(ExplorerError::Config(format!(
            "cache.live_capacity must be at least {}",
            LiveKey::ALL.len()
        )));
    }
    if config.stats.retention_days == 0 {
        return Err(ExplorerError::Config("stats.retention_days must be positive".into()));
    }
    Ok(())
}

/// Resolve the statistics database path, falling back to the user data dir
pub fn resolve_database_path(config: &ExplorerConfig) -> PathBuf {
    if !config.stats.database_path.is_empty() {
        return PathBuf::from(&config.stats.database_path);
    }

    dirs::data_dir()
        .map(|dir| dir.join("blockview"))
        .unwrap_or_else(|| PathBuf::from("data"))
        .join("stats.db")
}
