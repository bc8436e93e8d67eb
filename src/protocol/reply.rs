//! Reply definitions
//!
//! A store reply, shaped after RESP so both pool implementations can produce
//! it. The typed accessors fail with [`StoreError::UnexpectedReply`] naming
//! the command that produced the reply.

use bytes::Bytes;

use crate::error::StoreError;

use super::CommandType;

/// A reply from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Nil,
    Ok,
    Status(String),
    Integer(i64),
    Bulk(Bytes),
    Array(Vec<Reply>),
}

impl Reply {
    /// Build a SCAN page reply: `[cursor, [key, ...]]`
    pub fn scan_page(cursor: u64, keys: Vec<Bytes>) -> Self {
        Reply::Array(vec![
            Reply::Bulk(Bytes::from(cursor.to_string())),
            Reply::Array(keys.into_iter().map(Reply::Bulk).collect()),
        ])
    }

    /// Split a SCAN page reply into the next cursor and its keys
    pub fn into_scan_page(self) -> Result<(u64, Vec<Bytes>), StoreError> {
        let bad = |reply: &Reply| unexpected(CommandType::Scan, reply);

        let parts = match self {
            Reply::Array(parts) => parts,
            other => return Err(bad(&other)),
        };
        let [cursor, keys]: [Reply; 2] = match parts.try_into() {
            Ok(pair) => pair,
            Err(parts) => return Err(bad(&Reply::Array(parts))),
        };

        let next = match &cursor {
            Reply::Bulk(raw) => std::str::from_utf8(raw)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .ok_or_else(|| bad(&cursor))?,
            Reply::Integer(n) if *n >= 0 => *n as u64,
            other => return Err(bad(other)),
        };

        let items = match keys {
            Reply::Array(items) => items,
            other => return Err(bad(&other)),
        };
        let keys = items
            .into_iter()
            .map(|item| match item {
                Reply::Bulk(key) => Ok(key),
                other => Err(bad(&other)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((next, keys))
    }

    /// Blob reply; `Nil` maps to `None`
    pub fn into_bulk(self, command: CommandType) -> Result<Option<Bytes>, StoreError> {
        match self {
            Reply::Bulk(blob) => Ok(Some(blob)),
            Reply::Nil => Ok(None),
            other => Err(unexpected(command, &other)),
        }
    }

    pub fn into_integer(self, command: CommandType) -> Result<i64, StoreError> {
        match self {
            Reply::Integer(n) => Ok(n),
            other => Err(unexpected(command, &other)),
        }
    }

    /// Accept `OK` or any status line
    pub fn expect_ok(self, command: CommandType) -> Result<(), StoreError> {
        match self {
            Reply::Ok | Reply::Status(_) => Ok(()),
            other => Err(unexpected(command, &other)),
        }
    }
}

fn unexpected(command: CommandType, reply: &Reply) -> StoreError {
    StoreError::UnexpectedReply {
        command: command.name(),
        reply: format!("{reply:?}"),
    }
}
