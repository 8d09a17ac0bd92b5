/// Error types for the explorer core
///
/// Upstream failures are recoverable: they abort the current refresh cycle or
/// the current on-demand fetch and nothing more. Storage failures inside the
/// refresh cycle are swallowed by the caller; everywhere else they propagate.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Upstream request {path} failed: {message}")] Upstream {
        path: String,
        message: String,
    },

    #[error("Upstream request {path} returned HTTP {status}")] UpstreamStatus {
        path: String,
        status: u16,
    },

    #[error("Failed to decode upstream payload for {path}: {message}")] Decode {
        path: String,
        message: String,
    },

    #[error("Database error: {0}")] Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")] Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")] Config(String),

    #[error("IO error: {0}")] Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")] Task(String),
}

impl ExplorerError {
    pub fn upstream(path: &str, message: impl Into<String>) -> Self {
        ExplorerError::Upstream {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub fn decode(path: &str, message: impl Into<String>) -> Self {
        ExplorerError::Decode {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Upstream failures only cost the current cycle or request
    pub fn is_recoverable(&self) -> bool {
        match self {
            ExplorerError::Upstream { .. } => true,
            ExplorerError::UpstreamStatus { .. } => true,
            ExplorerError::Decode { .. } => true,
            _ => false,
        }
    }

    /// Path of the failing upstream request, if any
    pub fn upstream_path(&self) -> Option<&str> {
        match self {
            ExplorerError::Upstream { path, .. }
            | ExplorerError::UpstreamStatus { path, .. }
            | ExplorerError::Decode { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<tokio::task::JoinError> for ExplorerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ExplorerError::Task(err.to_string())
    }
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;
