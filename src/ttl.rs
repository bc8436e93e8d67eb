//! TTL helpers
//!
//! TTLs travel on the bus as decimal millisecond strings. The reader builds
//! them from PTTL replies, the writer parses them back before RESTORE.

use bytes::Bytes;

use crate::error::{StoreError, TtlError};
use crate::pool::Pool;
use crate::protocol::{Command, CommandType};

/// TTL meaning "never expires"
pub const NO_EXPIRY: &str = "0";

/// PTTL reply for a key without expiry
const PTTL_PERSISTENT: i64 = -1;

/// Turn a PTTL reply into a bus TTL
///
/// Only the persistent sentinel is rewritten; a missing-key reply (-2) is
/// kept so the writer drops that key.
pub fn normalize(pttl: i64) -> String {
    if pttl == PTTL_PERSISTENT {
        NO_EXPIRY.to_string()
    } else {
        pttl.to_string()
    }
}

/// Remaining TTL of `key`, or [`NO_EXPIRY`] without a round trip when TTL
/// sync is disabled
pub fn resolve<P: Pool + ?Sized>(pool: &P, key: &Bytes, sync_ttl: bool) -> Result<String, StoreError> {
    if !sync_ttl {
        return Ok(NO_EXPIRY.to_string());
    }

    let pttl = pool
        .execute(Command::Pttl { key: key.clone() })?
        .into_integer(CommandType::Pttl)?;

    Ok(normalize(pttl))
}

/// Validate a bus TTL before restoring it
pub fn parse(ttl: &str) -> Result<u64, TtlError> {
    let parsed: i64 = ttl.parse().map_err(|source| TtlError::Malformed {
        ttl: ttl.to_string(),
        source,
    })?;

    u64::try_from(parsed).map_err(|_| TtlError::Negative {
        ttl: ttl.to_string(),
    })
}
