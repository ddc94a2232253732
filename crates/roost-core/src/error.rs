//! Error types for roost-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration channel failure
    #[error("config error: {0}")]
    Config(String),

    /// Session persistence failure
    #[error("session error: {0}")]
    Session(String),

    /// Filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
