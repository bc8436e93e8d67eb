//! Writer
//!
//! Restores payloads from the bus into the target store, in bus order.
//!
//! A payload whose TTL is not a non-negative integer is skipped with a
//! warning; a failing RESTORE ends the whole write.

use std::sync::Arc;

use crossbeam::select;

use crate::bus::{BusReceiver, Payload};
use crate::cancel::{CancelCause, CancelToken};
use crate::config::Config;
use crate::error::{display_key, MigrateError, Result};
use crate::pool::Pool;
use crate::progress::{Progress, Side, TracingProgress};
use crate::protocol::{Command, CommandType};
use crate::ttl;

/// Verb used in cancellation errors
const OP: &str = "writing to";

/// Whether the writer may still receive from the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusState {
    Open,

    /// Closed by the reader and fully consumed
    Drained,
}

/// Outcome of one wait on the bus
enum Received {
    Cancelled,
    Closed,
    Payload(Payload),
}

/// Consuming side of a migration
pub struct Writer<P: Pool + ?Sized> {
    pool: Arc<P>,
    bus: BusReceiver,
    quiet: bool,
    progress: Arc<dyn Progress>,
}

impl<P: Pool + ?Sized> Writer<P> {
    /// Create a writer draining `bus`, configured from `config`
    pub fn new(pool: Arc<P>, bus: BusReceiver, config: &Config) -> Self {
        Self {
            pool,
            bus,
            quiet: config.quiet,
            progress: Arc::new(TracingProgress),
        }
    }

    /// Replace the default tracing observer
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// Restore payloads until the bus is closed and drained
    ///
    /// Returns `Ok(())` once drained or when the token fires with
    /// [`CancelCause::Stopped`].
    pub fn write(self, cancel: &CancelToken) -> Result<()> {
        let Writer {
            pool,
            bus,
            quiet,
            progress,
        } = self;

        let mut state = BusState::Open;
        let mut restored = 0usize;
        let mut skipped = 0usize;

        while state == BusState::Open {
            let received = if cancel.is_cancelled() {
                Received::Cancelled
            } else {
                select! {
                    recv(cancel.done()) -> _ => Received::Cancelled,
                    recv(bus) -> msg => msg.map_or(Received::Closed, Received::Payload),
                }
            };

            let payload = match received {
                Received::Cancelled => {
                    progress.stopped(Side::Writer);
                    return cancel
                        .cause()
                        .unwrap_or(CancelCause::Stopped)
                        .into_result(OP);
                }
                Received::Closed => {
                    state = BusState::Drained;
                    continue;
                }
                Received::Payload(payload) => payload,
            };

            let ttl = match ttl::parse(&payload.ttl) {
                Ok(ttl) => ttl,
                Err(reason) => {
                    skipped += 1;
                    progress.skipped(&payload.key, &payload.ttl, &reason);
                    continue;
                }
            };

            restore(&*pool, &payload, ttl)?;
            restored += 1;

            if !quiet {
                progress.restored(&payload.key, &payload.ttl);
            }
        }

        tracing::info!(restored, skipped, "done writing");
        Ok(())
    }
}

/// RESTORE key ttl value REPLACE
fn restore<P: Pool + ?Sized>(pool: &P, payload: &Payload, ttl: u64) -> Result<()> {
    let command = Command::Restore {
        key: payload.key.clone(),
        ttl,
        value: payload.value.clone(),
        replace: true,
    };

    pool.execute(command)
        .and_then(|reply| reply.expect_ok(CommandType::Restore))
        .map_err(|source| MigrateError::Restore {
            key: display_key(&payload.key),
            source,
        })
}
