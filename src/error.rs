//! Error types for the sentinel.
//!
//! A single [`SentinelError`] enum covers all operations, with a [`Result`]
//! alias. Whether an error is fatal is decided where the call is made: the
//! control loop propagates snapshot failures and absorbs recovery and
//! rebalance failures.

use thiserror::Error;

/// Main error type for sentinel operations.
#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse node listing: {0}")]
    NodeListing(#[from] serde_json::Error),

    #[error("HTTP request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for sentinel operations.
pub type Result<T> = std::result::Result<T, SentinelError>;
