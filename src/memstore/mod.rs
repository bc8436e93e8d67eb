//! MemStore Module
//!
//! In-process store that answers the same commands as a Redis instance.
//!
//! ## Responsibilities
//! - Ordered key space with lazy expiry
//! - SCAN paging in key order
//! - DUMP/RESTORE through a checksummed blob format
//! - PTTL with the Redis sentinels (-2 missing, -1 persistent)
//!
//! ## Data Structure Choice
//! BTreeMap wrapped in RwLock:
//! - Ordered keys let a SCAN cursor resume after the last key it returned,
//!   so deletes and inserts behind it never shift the rest of the scan
//! - Expired entries are hidden on read and overwritten on write

mod dump;
mod store;

use std::time::Instant;

use bytes::Bytes;

pub use dump::{decode, encode, DUMP_VERSION};
pub use store::MemoryStore;

/// Entry stored in the MemoryStore
#[derive(Debug, Clone, PartialEq)]
pub struct StoredValue {
    /// Raw value bytes
    pub value: Bytes,

    /// Absolute expiry, `None` for persistent keys
    pub expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
