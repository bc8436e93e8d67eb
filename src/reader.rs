//! Reader
//!
//! Scans the source key space and publishes one [`Payload`] per key on the
//! bus.
//!
//! ## Flow (per key)
//! 1. Next key from the SCAN cursor
//! 2. DUMP the value (fatal on failure, skipped if the key vanished)
//! 3. Resolve the TTL (no store call when TTL sync is off)
//! 4. Publish, racing the send against the cancellation token
//!
//! The bus sender is owned by [`Reader::read`], so the bus is closed exactly
//! once whichever way the function returns.

use std::sync::Arc;

use crossbeam::select;

use crate::bus::{BusSender, Payload};
use crate::cancel::{CancelCause, CancelToken};
use crate::config::Config;
use crate::error::{display_key, MigrateError, Result};
use crate::pool::{Pool, Scanner};
use crate::progress::{Progress, Side, TracingProgress};
use crate::protocol::{Command, CommandType};
use crate::ttl;

/// Verb used in cancellation errors
const OP: &str = "reading from";

/// Producing side of a migration
pub struct Reader<P: Pool + ?Sized> {
    pool: Arc<P>,
    bus: BusSender,

    /// Suppress per-key progress events
    quiet: bool,

    /// Query PTTL for every key
    sync_ttl: bool,

    scan_count: usize,
    progress: Arc<dyn Progress>,
}

impl<P: Pool + ?Sized> Reader<P> {
    /// Create a reader publishing on `bus`, configured from `config`
    pub fn new(pool: Arc<P>, bus: BusSender, config: &Config) -> Self {
        Self {
            pool,
            bus,
            quiet: config.quiet,
            sync_ttl: config.sync_ttl,
            scan_count: config.scan_count,
            progress: Arc::new(TracingProgress),
        }
    }

    /// Replace the default tracing observer
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// Scan the whole source and publish every key, then close the bus
    ///
    /// Returns `Ok(())` when the scan completes or the token fires with
    /// [`CancelCause::Stopped`]. Store failures are fatal and name the key.
    pub fn read(self, cancel: &CancelToken) -> Result<()> {
        let Reader {
            pool,
            bus,
            quiet,
            sync_ttl,
            scan_count,
            progress,
        } = self;

        let mut scanner = Scanner::new(&*pool, scan_count);

        while let Some(key) = scanner.next_key() {
            if let Some(cause) = cancel.cause() {
                return stop(&*progress, cause);
            }

            let dumped = pool
                .execute(Command::Dump { key: key.clone() })
                .and_then(|reply| reply.into_bulk(CommandType::Dump))
                .map_err(|source| MigrateError::Dump {
                    key: display_key(&key),
                    source,
                })?;
            let Some(value) = dumped else {
                tracing::debug!(key = %display_key(&key), "key vanished before DUMP, skipping");
                continue;
            };

            let ttl = ttl::resolve(&*pool, &key, sync_ttl).map_err(|source| MigrateError::Ttl {
                key: display_key(&key),
                source,
            })?;

            if let Some(cause) = cancel.cause() {
                return stop(&*progress, cause);
            }

            let size = value.len();
            let payload = Payload {
                key: key.clone(),
                value,
                ttl: ttl.clone(),
            };

            let sent = select! {
                recv(cancel.done()) -> _ => None,
                send(bus, payload) -> res => Some(res),
            };

            match sent {
                None => {
                    let cause = cancel.cause().unwrap_or(CancelCause::Stopped);
                    return stop(&*progress, cause);
                }
                Some(Err(_)) => return Err(MigrateError::BusDisconnected),
                Some(Ok(())) => {
                    if !quiet {
                        progress.dumped(&key, &ttl, size);
                    }
                }
            }
        }

        scanner.close().map_err(MigrateError::Scan)?;
        tracing::debug!("done reading");

        Ok(())
    }
}

fn stop(progress: &dyn Progress, cause: CancelCause) -> Result<()> {
    progress.stopped(Side::Reader);
    cause.into_result(OP)
}
