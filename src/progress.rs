//! Progress reporting
//!
//! Reader and writer report what they do through an injected [`Progress`]
//! instead of printing. Events are informational only.

use std::fmt;

use crate::error::{display_key, TtlError};

/// Which side of the pipeline an event comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Reader,
    Writer,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Reader => f.write_str("reader"),
            Side::Writer => f.write_str("writer"),
        }
    }
}

/// Observer of per-key pipeline events
pub trait Progress: Send + Sync {
    /// A key was dumped and published on the bus
    fn dumped(&self, key: &[u8], ttl: &str, size: usize);

    /// A key was restored on the target
    fn restored(&self, key: &[u8], ttl: &str);

    /// A key was dropped because its TTL cannot be restored
    fn skipped(&self, key: &[u8], ttl: &str, reason: &TtlError);

    /// A side stopped because the cancellation token fired
    fn stopped(&self, side: Side) {
        tracing::info!(%side, "done: cancelled");
    }
}

/// Default observer emitting `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn dumped(&self, key: &[u8], ttl: &str, size: usize) {
        tracing::info!(key = %display_key(key), ttl, size, "DUMP");
    }

    fn restored(&self, key: &[u8], ttl: &str) {
        tracing::info!(key = %display_key(key), ttl, "RESTORE");
    }

    fn skipped(&self, key: &[u8], ttl: &str, reason: &TtlError) {
        tracing::warn!(key = %display_key(key), ttl, error = %reason, "skipping key with invalid TTL");
    }
}
