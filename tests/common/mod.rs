//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use kvferry::error::{StoreError, TtlError};
use kvferry::pool::Pool;
use kvferry::progress::{Progress, Side};
use kvferry::protocol::{Command, CommandType, Reply};
use kvferry::{Config, MemoryStore};

// =============================================================================
// Config
// =============================================================================

pub fn config(sync_ttl: bool) -> Config {
    Config::builder()
        .sync_ttl(sync_ttl)
        .quiet(false)
        .bus_capacity(16)
        .scan_count(3)
        .build()
}

// =============================================================================
// Recording Progress
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Dumped { key: String, ttl: String, size: usize },
    Restored { key: String, ttl: String },
    Skipped { key: String, ttl: String },
    Stopped(Side),
}

/// Progress observer that keeps every event
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn restored_keys(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Restored { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn skipped_keys(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Skipped { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }
}

fn text(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}

impl Progress for Recorder {
    fn dumped(&self, key: &[u8], ttl: &str, size: usize) {
        self.push(Event::Dumped {
            key: text(key),
            ttl: ttl.to_string(),
            size,
        });
    }

    fn restored(&self, key: &[u8], ttl: &str) {
        self.push(Event::Restored {
            key: text(key),
            ttl: ttl.to_string(),
        });
    }

    fn skipped(&self, key: &[u8], ttl: &str, _reason: &TtlError) {
        self.push(Event::Skipped {
            key: text(key),
            ttl: ttl.to_string(),
        });
    }

    fn stopped(&self, side: Side) {
        self.push(Event::Stopped(side));
    }
}

// =============================================================================
// Fault Injection
// =============================================================================

/// MemoryStore wrapper failing one command type, optionally for one key only
pub struct FaultyPool {
    pub store: MemoryStore,
    fail_on: Mutex<Option<(CommandType, Option<Bytes>)>>,
}

impl FaultyPool {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            fail_on: Mutex::new(None),
        }
    }

    /// Fail every command of `kind`
    pub fn fail(self, kind: CommandType) -> Self {
        *self.fail_on.lock() = Some((kind, None));
        self
    }

    /// Fail commands of `kind` addressed to `key`
    pub fn fail_key(self, kind: CommandType, key: &'static str) -> Self {
        *self.fail_on.lock() = Some((kind, Some(Bytes::from_static(key.as_bytes()))));
        self
    }

    fn should_fail(&self, command: &Command) -> bool {
        let Some((kind, key)) = self.fail_on.lock().clone() else {
            return false;
        };
        if command.command_type() != kind {
            return false;
        }

        let target = match command {
            Command::Dump { key } | Command::Pttl { key } => Some(key),
            Command::Restore { key, .. } => Some(key),
            Command::Scan { .. } | Command::Ping => None,
        };
        match (key, target) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted == *actual,
            (Some(_), None) => false,
        }
    }
}

impl Pool for FaultyPool {
    fn execute(&self, command: Command) -> Result<Reply, StoreError> {
        if self.should_fail(&command) {
            return Err(StoreError::Server(format!(
                "ERR injected failure on {}",
                command.command_type().name()
            )));
        }
        self.store.execute(command)
    }
}

/// SCAN fails after the first page has been served
pub struct SecondPageFails {
    pub store: MemoryStore,
}

impl Pool for SecondPageFails {
    fn execute(&self, command: Command) -> Result<Reply, StoreError> {
        if let Command::Scan { cursor, .. } = command {
            if cursor != 0 {
                return Err(StoreError::Server("ERR connection lost mid-scan".into()));
            }
        }
        self.store.execute(command)
    }
}

/// Store holding `keys`, each valued `value-of-<key>`
pub fn store_with(keys: &[&'static str]) -> MemoryStore {
    let store = MemoryStore::new();
    for key in keys {
        store.set(*key, format!("value-of-{key}"));
    }
    store
}
