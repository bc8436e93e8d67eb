//! Cancellation
//!
//! A cloneable token shared by reader, writer and whoever drives them. It
//! fires once, carrying a typed cause: [`CancelCause::Stopped`] is an
//! expected stop and ends a task cleanly, anything else surfaces as
//! [`MigrateError::Cancelled`].

use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::error::{MigrateError, Result};

/// Why a token fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelCause {
    /// Expected stop, not an error
    Stopped,

    /// Stop caused by a failure elsewhere
    Failed(String),
}

impl CancelCause {
    /// Outcome of a task interrupted with this cause while doing `op`
    pub fn into_result(self, op: &'static str) -> Result<()> {
        match self {
            CancelCause::Stopped => Ok(()),
            CancelCause::Failed(cause) => Err(MigrateError::Cancelled { op, cause }),
        }
    }
}

/// Shared cancellation signal
///
/// `done()` is a channel that never carries a message; it disconnects when
/// the token fires, so it can sit in a `select!` next to bus operations.
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cause: Mutex<Option<CancelCause>>,

    /// Dropped when the token fires
    trigger: Mutex<Option<Sender<()>>>,

    done: Receiver<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, done) = channel::bounded(0);
        Self {
            inner: Arc::new(Inner {
                cause: Mutex::new(None),
                trigger: Mutex::new(Some(trigger)),
                done,
            }),
        }
    }

    /// Fire the token. Only the first cause is kept; returns whether this
    /// call was the one that fired it.
    pub fn cancel(&self, cause: CancelCause) -> bool {
        let mut slot = self.inner.cause.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(cause);
        drop(self.inner.trigger.lock().take());
        true
    }

    /// Fire with the expected-stop cause
    pub fn stop(&self) -> bool {
        self.cancel(CancelCause::Stopped)
    }

    /// Fire with a failure cause
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.cancel(CancelCause::Failed(reason.into()))
    }

    pub fn cause(&self) -> Option<CancelCause> {
        self.inner.cause.lock().clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cause.lock().is_some()
    }

    /// Receiver that becomes ready (disconnected) once the token fires
    pub fn done(&self) -> &Receiver<()> {
        &self.inner.done
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
