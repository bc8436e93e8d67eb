//! Command definitions
//!
//! Represents the store calls made by the reader and writer.

use bytes::Bytes;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    Ping,
    Scan,
    Dump,
    Pttl,
    Restore,
}

impl CommandType {
    /// Command name as sent on the wire
    pub fn name(self) -> &'static str {
        match self {
            CommandType::Ping => "PING",
            CommandType::Scan => "SCAN",
            CommandType::Dump => "DUMP",
            CommandType::Pttl => "PTTL",
            CommandType::Restore => "RESTORE",
        }
    }
}

/// A store command
#[derive(Debug, Clone)]
pub enum Command {
    /// Health check
    Ping,

    /// Fetch one page of the key space starting at `cursor`
    Scan { cursor: u64, count: usize },

    /// Serialize the value at `key` into an opaque blob
    Dump { key: Bytes },

    /// Remaining time to live of `key` in milliseconds
    Pttl { key: Bytes },

    /// Install a dumped blob at `key`, expiring after `ttl` ms (0 = never)
    Restore {
        key: Bytes,
        ttl: u64,
        value: Bytes,
        replace: bool,
    },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Ping => CommandType::Ping,
            Command::Scan { .. } => CommandType::Scan,
            Command::Dump { .. } => CommandType::Dump,
            Command::Pttl { .. } => CommandType::Pttl,
            Command::Restore { .. } => CommandType::Restore,
        }
    }
}
