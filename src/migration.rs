//! Migration
//!
//! Runs a reader and a writer as sibling threads over a fresh bus. The first
//! task to fail fires the shared token with [`CancelCause::Failed`] so the
//! other one stops, and its error is the one returned.
//!
//! [`CancelCause::Failed`]: crate::cancel::CancelCause::Failed

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::bus;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{MigrateError, Result};
use crate::pool::Pool;
use crate::progress::{Progress, TracingProgress};
use crate::reader::Reader;
use crate::writer::Writer;

/// A configured source → target copy
pub struct Migration<S: Pool + ?Sized, D: Pool + ?Sized> {
    source: Arc<S>,
    target: Arc<D>,
    config: Config,
    progress: Arc<dyn Progress>,
}

impl<S: Pool + ?Sized, D: Pool + ?Sized> Migration<S, D> {
    pub fn new(source: Arc<S>, target: Arc<D>, config: Config) -> Self {
        Self {
            source,
            target,
            config,
            progress: Arc::new(TracingProgress),
        }
    }

    /// Observer handed to both reader and writer
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// Copy every key, returning the first fatal error of either side
    pub fn run(&self, cancel: &CancelToken) -> Result<()> {
        self.config.validate()?;

        let (tx, rx) = bus::channel(self.config.bus_capacity);
        let reader = Reader::new(Arc::clone(&self.source), tx, &self.config)
            .with_progress(Arc::clone(&self.progress));
        let writer = Writer::new(Arc::clone(&self.target), rx, &self.config)
            .with_progress(Arc::clone(&self.progress));

        let first_error = FirstError::default();
        let record = |result: Result<()>| first_error.record(cancel, result);

        tracing::info!(
            sync_ttl = self.config.sync_ttl,
            bus_capacity = self.config.bus_capacity,
            "migration started"
        );

        thread::scope(|scope| {
            let read = scope.spawn(|| record(reader.read(cancel)));
            let write = scope.spawn(|| record(writer.write(cancel)));

            if read.join().is_err() {
                record(Err(MigrateError::TaskPanicked("reader")));
            }
            if write.join().is_err() {
                record(Err(MigrateError::TaskPanicked("writer")));
            }
        });

        match first_error.take() {
            Some(e) => Err(e),
            None => {
                tracing::info!("migration finished");
                Ok(())
            }
        }
    }
}

/// Slot for the error a run reports
///
/// The first error fires the token. A reader that failed only because the
/// writer went away and dropped the bus yields to the writer's own error,
/// which can be recorded a moment later.
#[derive(Default)]
struct FirstError {
    slot: Mutex<Option<MigrateError>>,
}

impl FirstError {
    fn record(&self, cancel: &CancelToken, result: Result<()>) {
        let Err(e) = result else {
            return;
        };

        let mut slot = self.slot.lock();
        match slot.as_ref() {
            None => {
                cancel.fail(e.to_string());
                *slot = Some(e);
            }
            Some(MigrateError::BusDisconnected) if !is_induced(&e) => *slot = Some(e),
            Some(_) => {}
        }
    }

    fn take(self) -> Option<MigrateError> {
        self.slot.into_inner()
    }
}

/// Errors that only echo another task's failure
fn is_induced(error: &MigrateError) -> bool {
    matches!(
        error,
        MigrateError::Cancelled { .. } | MigrateError::BusDisconnected
    )
}
