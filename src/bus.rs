//! Payload bus
//!
//! The single FIFO channel between reader and writer. The sender is owned by
//! the reader and closing the bus is dropping it; the receiver is owned by
//! the writer.

use bytes::Bytes;
use crossbeam::channel::{bounded, Receiver, Sender};

/// One migrated record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub key: Bytes,

    /// Opaque DUMP blob
    pub value: Bytes,

    /// Milliseconds to live as a decimal string, "0" for no expiry
    pub ttl: String,
}

impl Payload {
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>, ttl: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl: ttl.into(),
        }
    }
}

/// Producing end, held by the reader only
pub type BusSender = Sender<Payload>;

/// Consuming end, held by the writer only
pub type BusReceiver = Receiver<Payload>;

/// Create a bus buffering up to `capacity` payloads (0 = rendezvous)
pub fn channel(capacity: usize) -> (BusSender, BusReceiver) {
    bounded(capacity)
}
