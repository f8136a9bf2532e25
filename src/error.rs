//! Error types for Hearth
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Hearth
#[derive(Debug, Error)]
pub enum HearthError {
    /// LLM API error (transport, auth, rate limit, malformed response)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type alias for Hearth operations
pub type Result<T> = std::result::Result<T, HearthError>;
