/// Runtime logger configuration
use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Lines above this level are dropped
    pub min_level: LogLevel,
    /// Tags with debug output enabled (debug keys, lowercase)
    pub debug_tags: HashSet<String>,
    /// Show verbose lines for every tag
    pub verbose: bool,
    /// Disable ANSI colors (piped output)
    pub plain: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose: false,
            plain: false,
        }
    }
}

impl LoggerConfig {
    /// Build from a level name plus `--debug-<tag>` style flags
    pub fn from_flags(level: &str, flags: &[String], verbose: bool) -> Self {
        let mut min_level = LogLevel::parse(level).unwrap_or(LogLevel::Info);
        let debug_tags: HashSet<String> = flags
            .iter()
            .filter_map(|flag| flag.strip_prefix("--debug-").or(Some(flag.as_str())))
            .map(|tag| tag.to_lowercase())
            .collect();

        if verbose {
            min_level = LogLevel::Verbose;
        } else if !debug_tags.is_empty() && min_level < LogLevel::Debug {
            min_level = LogLevel::Debug;
        }

        Self {
            min_level,
            debug_tags,
            verbose,
            plain: false,
        }
    }

    pub fn is_debug_enabled(&self, tag: &LogTag) -> bool {
        self.verbose || self.debug_tags.contains(&tag.to_debug_key())
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flags_raise_level() {
        let config = LoggerConfig::from_flags(
            "info",
            &["--debug-updater".to_string(), "stats".to_string()],
            false,
        );
        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(config.is_debug_enabled(&LogTag::Updater));
        assert!(config.is_debug_enabled(&LogTag::Stats));
        assert!(!config.is_debug_enabled(&LogTag::Cache));
    }

    #[test]
    fn test_verbose_enables_everything() {
        let config = LoggerConfig::from_flags("warning", &[], true);
        assert_eq!(config.min_level, LogLevel::Verbose);
        assert!(config.is_debug_enabled(&LogTag::Upstream));
    }
}
