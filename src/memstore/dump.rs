//! DUMP payload format
//!
//! ```text
//! ┌──────────┬─────────────────┬─────────────┬──────────┐
//! │ Type (1) │     Value       │ Version (2) │ CRC (4)  │
//! └──────────┴─────────────────┴─────────────┴──────────┘
//! ```
//!
//! Version and CRC are little-endian. The CRC covers every preceding byte.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::StoreError;

/// Payload format version written by [`encode`]
pub const DUMP_VERSION: u16 = 1;

/// Type tag for plain string values
const TYPE_STRING: u8 = 0;

/// Type (1) + Version (2) + CRC (4)
const FRAME_OVERHEAD: usize = 7;

/// Serialize a value into a DUMP blob
pub fn encode(value: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(value.len() + FRAME_OVERHEAD);
    buf.put_u8(TYPE_STRING);
    buf.put_slice(value);
    buf.put_u16_le(DUMP_VERSION);

    let crc = crc32fast::hash(&buf);
    buf.put_u32_le(crc);

    buf.freeze()
}

/// Recover the value from a DUMP blob, verifying version and checksum
pub fn decode(blob: &[u8]) -> Result<Bytes, StoreError> {
    if blob.len() < FRAME_OVERHEAD {
        return Err(bad_payload());
    }

    let (body, crc) = blob.split_at(blob.len() - 4);
    let expected = u32::from_le_bytes([crc[0], crc[1], crc[2], crc[3]]);
    if crc32fast::hash(body) != expected {
        return Err(bad_payload());
    }

    let (framed, version) = body.split_at(body.len() - 2);
    if u16::from_le_bytes([version[0], version[1]]) != DUMP_VERSION {
        return Err(bad_payload());
    }
    if framed[0] != TYPE_STRING {
        return Err(StoreError::Server(format!(
            "ERR Bad data format: unknown type {}",
            framed[0]
        )));
    }

    Ok(Bytes::copy_from_slice(&framed[1..]))
}

fn bad_payload() -> StoreError {
    StoreError::Server("ERR DUMP payload version or checksum are wrong".into())
}
