//! Error types for roost-stream

use thiserror::Error;

/// Stream error type
#[derive(Debug, Error)]
pub enum Error {
    /// A stream must never be opened without a session token
    #[error("cannot open event stream without a session token")]
    EmptyToken,

    /// The notification base URL could not be parsed
    #[error("invalid stream URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
