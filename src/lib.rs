//! # kvferry
//!
//! Copies the full key space of one Redis-compatible store into another:
//! - Values travel as native DUMP blobs and are installed with RESTORE
//! - Optional TTL sync through PTTL
//! - Bounded bus between an independent reader and writer
//! - Cooperative cancellation with a typed cause
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐        ┌─────────────┐        ┌──────────────┐
//! │   Source     │  SCAN  │   Reader    │        │   Target     │
//! │    Pool      │◄───────┤ DUMP / PTTL │        │    Pool      │
//! └──────────────┘        └──────┬──────┘        └──────▲───────┘
//!                                │ Payload              │ RESTORE
//!                                ▼                      │ … REPLACE
//!                         ┌─────────────┐        ┌──────┴───────┐
//!                         │     Bus     ├───────►│    Writer    │
//!                         │  (bounded)  │        │              │
//!                         └─────────────┘        └──────────────┘
//!                   ▲                                   ▲
//!                   └──────────── CancelToken ──────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod pool;
pub mod memstore;

pub mod bus;
pub mod cancel;
pub mod progress;
pub mod ttl;
pub mod reader;
pub mod writer;
pub mod migration;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MigrateError, Result, StoreError, TtlError};
pub use config::Config;
pub use bus::Payload;
pub use cancel::{CancelCause, CancelToken};
pub use memstore::MemoryStore;
pub use migration::Migration;
pub use pool::{Pool, RedisPool};
pub use reader::Reader;
pub use writer::Writer;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvferry
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
