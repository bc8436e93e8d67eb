//! Key-space scanner
//!
//! Walks the whole key space one SCAN page at a time. Only the current page
//! is held in memory.

use std::collections::VecDeque;

use bytes::Bytes;

use crate::error::StoreError;
use crate::protocol::Command;

use super::Pool;

/// Incremental cursor over every key of a store
///
/// Iteration stops at the first failing page; the failure is reported by
/// [`Scanner::close`].
pub struct Scanner<'a, P: Pool + ?Sized> {
    pool: &'a P,

    /// COUNT hint for each page
    count: usize,

    /// Cursor of the next page to fetch
    cursor: u64,

    /// Keys of the current page not yet handed out
    page: VecDeque<Bytes>,

    /// Set once the store returned cursor 0 or a page failed
    exhausted: bool,

    error: Option<StoreError>,
}

impl<'a, P: Pool + ?Sized> Scanner<'a, P> {
    pub fn new(pool: &'a P, count: usize) -> Self {
        Self {
            pool,
            count: count.max(1),
            cursor: 0,
            page: VecDeque::new(),
            exhausted: false,
            error: None,
        }
    }

    /// Next key, fetching a new page when the current one is used up
    pub fn next_key(&mut self) -> Option<Bytes> {
        loop {
            if let Some(key) = self.page.pop_front() {
                return Some(key);
            }
            if self.exhausted {
                return None;
            }
            self.fetch_page();
        }
    }

    fn fetch_page(&mut self) {
        let command = Command::Scan {
            cursor: self.cursor,
            count: self.count,
        };

        match self.pool.execute(command).and_then(|reply| reply.into_scan_page()) {
            Ok((next, keys)) => {
                tracing::trace!(cursor = self.cursor, next, keys = keys.len(), "scan page");
                self.cursor = next;
                self.exhausted = next == 0;
                self.page.extend(keys);
            }
            Err(e) => {
                tracing::debug!(cursor = self.cursor, error = %e, "scan page failed");
                self.exhausted = true;
                self.error = Some(e);
            }
        }
    }

    /// Finish the scan, surfacing the page failure that ended it, if any
    pub fn close(self) -> Result<(), StoreError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<P: Pool + ?Sized> Iterator for Scanner<'_, P> {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        self.next_key()
    }
}
