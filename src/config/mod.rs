//! Configuration: schemas with embedded defaults, TOML loading, validation

pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{
    CacheSettings, ExplorerConfig, LoggingConfig, StatsConfig, UpdaterConfig, UpstreamConfig,
};
pub use utils::{
    load_config, parse_config, resolve_database_path, unknown_keys, validate, CONFIG_FILE_PATH,
};
