//! Structured, tagged logging for the explorer core
//!
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-component debug control via `debug_tags` (or `--debug-<tag>` flags)
//! - Colored console output with aligned tag and level columns
//! - A `log` facade bridge so dependency logs share the same output
//!
//! ```rust,no_run
//! use blockview::logger::{self, LogTag};
//!
//! logger::info(LogTag::Updater, "Refresh cycle published tip 840000");
//! logger::debug(LogTag::Cache, "Live cache miss for dashboard"); // only with debug on Cache
//! ```

mod bridge;
mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger with the given configuration
///
/// Safe to call more than once; the latest configuration wins and the `log`
/// bridge is installed only on the first call.
pub fn init(config: LoggerConfig) {
    set_logger_config(config);
    bridge::install();
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (normal operation)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level, only shown when debug is enabled for the tag
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level, only shown with verbose output enabled
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}
