//! Error types for live-link

use thiserror::Error;

/// Errors raised by host operations inside the live-update engine.
///
/// None of these ever reach the page user: the engine logs them and falls
/// back to "no live update".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiveLinkError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Refresh failed for {url}: {reason}")]
    Refresh { url: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LiveLinkError {
    fn from(err: serde_json::Error) -> Self {
        LiveLinkError::Serialization(err.to_string())
    }
}

/// Result type for live-link operations
pub type Result<T> = std::result::Result<T, LiveLinkError>;
