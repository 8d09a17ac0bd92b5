/// Component tags attached to every log line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Upstream,
    Cache,
    Updater,
    Stats,
    Other(String),
}

impl LogTag {
    /// Key used by `debug_tags` and `--debug-<key>` flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Upstream => "upstream".to_string(),
            LogTag::Cache => "cache".to_string(),
            LogTag::Updater => "updater".to_string(),
            LogTag::Stats => "stats".to_string(),
            LogTag::Other(name) => name.to_lowercase(),
        }
    }

    /// Uncolored label for the tag column
    pub fn label(&self) -> String {
        match self {
            LogTag::Other(name) => name.to_uppercase(),
            other => other.to_debug_key().to_uppercase(),
        }
    }
}
