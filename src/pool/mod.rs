//! Pool Module
//!
//! Store access for the pipeline.
//!
//! ## Architecture
//! - [`Pool`]: execute one command, decode one reply
//! - [`Scanner`]: full-key-space cursor built on SCAN pages
//! - [`RedisPool`]: `redis` crate connections behind an idle stack
//!
//! Every call is independent; neither the pool nor the scanner retries.

mod redis_pool;
mod scanner;

use std::sync::Arc;

use crate::error::StoreError;
use crate::protocol::{Command, Reply};

pub use redis_pool::RedisPool;
pub use scanner::Scanner;

/// A handle able to run store commands
///
/// Implementations must tolerate one in-flight call per thread using them.
pub trait Pool: Send + Sync {
    /// Run a single command and return its decoded reply
    fn execute(&self, command: Command) -> Result<Reply, StoreError>;
}

impl<P: Pool + ?Sized> Pool for Arc<P> {
    fn execute(&self, command: Command) -> Result<Reply, StoreError> {
        (**self).execute(command)
    }
}
