//! Protocol Module
//!
//! The command set the pipeline issues against a store, and the replies it
//! expects back.
//!
//! ### Commands
//! - SCAN    cursor COUNT n           -> [cursor, [key, ...]]
//! - DUMP    key                      -> blob | nil
//! - PTTL    key                      -> integer (-2 missing, -1 persistent)
//! - RESTORE key ttl blob [REPLACE]   -> OK
//! - PING                             -> PONG

mod command;
mod reply;

pub use command::{Command, CommandType};
pub use reply::Reply;
