//! Error types for kvferry
//!
//! Store calls fail with [`StoreError`]; the pipeline wraps those with the
//! offending key and operation in [`MigrateError`].

use std::num::ParseIntError;

use thiserror::Error;

/// Result type alias using MigrateError
pub type Result<T> = std::result::Result<T, MigrateError>;

/// Failure of a single store call
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Error reply produced by the store itself
    #[error("Server error: {0}")]
    Server(String),

    #[error("Unexpected reply to {command}: {reply}")]
    UnexpectedReply {
        command: &'static str,
        reply: String,
    },
}

/// A TTL string on the bus that cannot be restored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TtlError {
    #[error("invalid TTL \"{ttl}\": {source}")]
    Malformed {
        ttl: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid TTL \"{ttl}\": negative")]
    Negative { ttl: String },
}

/// Error returned by the reader, the writer and the orchestrator
#[derive(Debug, Error)]
pub enum MigrateError {
    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("error reading key '{key}' from store: {source}")]
    Dump {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("error syncing ttl for key '{key}': {source}")]
    Ttl {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("error restoring key '{key}': {source}")]
    Restore {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("error scanning store: {0}")]
    Scan(#[source] StoreError),

    #[error("error connecting to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: StoreError,
    },

    // -------------------------------------------------------------------------
    // Pipeline Errors
    // -------------------------------------------------------------------------
    #[error("error {op} store: cancelled: {cause}")]
    Cancelled { op: &'static str, cause: String },

    #[error("payload bus disconnected before the scan finished")]
    BusDisconnected,

    #[error("{0} task panicked")]
    TaskPanicked(&'static str),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Render a binary key for error messages and logs
pub fn display_key(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}
