/// Command-line arguments for the `blockview` binary
///
/// Every flag overrides the matching key of the TOML configuration, so the
/// file stays the single source of defaults.
use crate::config::{ExplorerConfig, CONFIG_FILE_PATH};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "blockview")]
#[command(about = "Caching and background-refresh core for a blockchain explorer", long_about = None)]
pub struct Arguments {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = CONFIG_FILE_PATH)]
    pub config: PathBuf,

    /// Override the upstream base URL
    #[arg(long)]
    pub upstream: Option<String>,

    /// Override the refresh interval in seconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Override the statistics database path
    #[arg(long)]
    pub database: Option<String>,

    /// Minimum log level (error, warning, info, debug, verbose)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Enable debug output for a tag, repeatable (system, config, upstream, cache, updater, stats)
    #[arg(long = "debug", value_name = "TAG")]
    pub debug_tags: Vec<String>,

    /// Verbose output for every tag
    #[arg(short, long)]
    pub verbose: bool,
}

impl Arguments {
    pub fn apply(&self, config: &mut ExplorerConfig) {
        if let Some(url) = &self.upstream {
            config.upstream.base_url = url.clone();
        }
        if let Some(interval) = self.interval {
            config.updater.interval_secs = interval;
        }
        if let Some(path) = &self.database {
            config.stats.database_path = path.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        config.logging.debug_tags.extend(self.debug_tags.iter().cloned());
        config.logging.verbose |= self.verbose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_config_untouched() {
        let args = Arguments::try_parse_from(["blockview"]).unwrap();
        assert_eq!(args.config, PathBuf::from(CONFIG_FILE_PATH));

        let mut config = ExplorerConfig::default();
        args.apply(&mut config);
        assert_eq!(config, ExplorerConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Arguments::try_parse_from([
            "blockview",
            "--config",
            "/etc/blockview.toml",
            "--upstream",
            "http://localhost:3002",
            "--interval",
            "10",
            "--debug",
            "updater",
            "--debug",
            "stats",
        ])
        .unwrap();

        let mut config = ExplorerConfig::default();
        args.apply(&mut config);

        assert_eq!(args.config, PathBuf::from("/etc/blockview.toml"));
        assert_eq!(config.upstream.base_url, "http://localhost:3002");
        assert_eq!(config.updater.interval_secs, 10);
        assert_eq!(config.logging.debug_tags, vec!["updater", "stats"]);
        assert!(!config.logging.verbose);
    }
}
