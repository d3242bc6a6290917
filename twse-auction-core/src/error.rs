//! Error types for the auction calendar pipeline.

use thiserror::Error;

/// Errors that can occur in pipeline operations.
///
/// Malformed dates or numbers inside a row never surface here. They resolve
/// to an absent value where they are read.
#[derive(Error, Debug)]
pub enum AuctionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source data error: {0}")]
    SourceData(String),

    #[error("Snapshot read error: {0}")]
    SnapshotRead(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for pipeline operations.
pub type AuctionResult<T> = Result<T, AuctionError>;
