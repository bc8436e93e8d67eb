//! MemoryStore implementation
//!
//! BTreeMap-based store with RwLock for concurrency.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound::{Excluded, Unbounded};
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};

use crate::error::StoreError;
use crate::pool::Pool;
use crate::protocol::{Command, CommandType, Reply};

use super::{dump, StoredValue};

/// In-memory store speaking the migration command set
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<Bytes, StoredValue>>,

    /// Commands executed through [`Pool::execute`], by type
    calls: Mutex<HashMap<CommandType, usize>>,

    /// Open SCAN cursors, each mapped to the last key it handed out
    cursors: Mutex<ScanCursors>,
}

#[derive(Default)]
struct ScanCursors {
    resume_after: HashMap<u64, Bytes>,
    last_id: u64,
}

impl ScanCursors {
    fn open(&mut self, last: Bytes) -> u64 {
        // 0 is reserved for "start" and "done"
        self.last_id = self.last_id.checked_add(1).unwrap_or(1);
        self.resume_after.insert(self.last_id, last);
        self.last_id
    }
}

impl MemoryStore {
    /// Create a new empty MemoryStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a persistent key
    pub fn set(&self, key: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.insert(key.into(), value.into(), None);
    }

    /// Set a key expiring after `ttl`
    pub fn set_with_ttl(&self, key: impl Into<Bytes>, value: impl Into<Bytes>, ttl: Duration) {
        self.insert(key.into(), value.into(), Some(Instant::now() + ttl));
    }

    /// Value of a live key
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        let now = Instant::now();
        self.data
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone())
    }

    /// Remove a key, returning whether it was live
    pub fn delete(&self, key: &[u8]) -> bool {
        let now = Instant::now();
        self.data
            .write()
            .remove(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Remaining lifetime in ms; -2 when missing, -1 when persistent
    pub fn pttl(&self, key: &[u8]) -> i64 {
        let now = Instant::now();
        match self.data.read().get(key) {
            None => -2,
            Some(entry) if entry.is_expired(now) => -2,
            Some(StoredValue {
                expires_at: None, ..
            }) => -1,
            Some(StoredValue {
                expires_at: Some(at),
                ..
            }) => at.saturating_duration_since(now).as_millis() as i64,
        }
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.data
            .read()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live keys in order
    pub fn keys(&self) -> Vec<Bytes> {
        let now = Instant::now();
        self.data
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// How many commands of `kind` went through [`Pool::execute`]
    pub fn command_count(&self, kind: CommandType) -> usize {
        self.calls.lock().get(&kind).copied().unwrap_or(0)
    }

    fn insert(&self, key: Bytes, value: Bytes, expires_at: Option<Instant>) {
        self.data
            .write()
            .insert(key, StoredValue { value, expires_at });
    }

    fn scan(&self, cursor: u64, count: usize) -> Result<Reply, StoreError> {
        let resume_after = match cursor {
            0 => None,
            id => match self.cursors.lock().resume_after.remove(&id) {
                Some(last) => Some(last),
                None => return Err(StoreError::Server("ERR invalid cursor".into())),
            },
        };

        let now = Instant::now();
        let data = self.data.read();
        let mut entries = match &resume_after {
            None => data.range::<Bytes, _>(..),
            Some(last) => data.range::<Bytes, _>((Excluded(last), Unbounded)),
        };

        let visited: Vec<(&Bytes, &StoredValue)> = entries.by_ref().take(count).collect();
        let more = entries.next().is_some();

        let next = match visited.last() {
            Some((last, _)) if more => self.cursors.lock().open((*last).clone()),
            _ => 0,
        };
        let page = visited
            .into_iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        Ok(Reply::scan_page(next, page))
    }

    fn restore(&self, key: Bytes, ttl: u64, blob: &[u8], replace: bool) -> Result<Reply, StoreError> {
        let value = dump::decode(blob)?;
        let now = Instant::now();

        let mut data = self.data.write();
        let occupied = data.get(&key).is_some_and(|entry| !entry.is_expired(now));
        if occupied && !replace {
            return Err(StoreError::Server(
                "BUSYKEY Target key name already exists.".into(),
            ));
        }

        let expires_at = (ttl > 0).then(|| now + Duration::from_millis(ttl));
        data.insert(key, StoredValue { value, expires_at });

        Ok(Reply::Ok)
    }
}

impl Pool for MemoryStore {
    fn execute(&self, command: Command) -> Result<Reply, StoreError> {
        *self.calls.lock().entry(command.command_type()).or_insert(0) += 1;

        match command {
            Command::Ping => Ok(Reply::Status("PONG".into())),
            Command::Scan { cursor, count } => self.scan(cursor, count.max(1)),
            Command::Dump { key } => Ok(match self.get(&key) {
                Some(value) => Reply::Bulk(dump::encode(&value)),
                None => Reply::Nil,
            }),
            Command::Pttl { key } => Ok(Reply::Integer(self.pttl(&key))),
            Command::Restore {
                key,
                ttl,
                value,
                replace,
            } => self.restore(key, ttl, &value, replace),
        }
    }
}
