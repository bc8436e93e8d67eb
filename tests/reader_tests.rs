//! Tests for Reader
//!
//! These tests verify:
//! - Every scanned key is published, in scan order, with its DUMP blob
//! - TTL resolution with and without TTL sync
//! - Store failures abort with the key named, bus still closed
//! - Cancellation before and during the bus send

mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use crossbeam::channel::TryRecvError;

use common::{config, store_with, Event, FaultyPool, Recorder, SecondPageFails};
use kvferry::bus::{self, Payload};
use kvferry::error::StoreError;
use kvferry::memstore;
use kvferry::pool::Pool;
use kvferry::progress::Side;
use kvferry::protocol::{Command, CommandType, Reply};
use kvferry::{CancelToken, Config, MemoryStore, MigrateError, Reader};

// =============================================================================
// Helper Functions
// =============================================================================

fn drain(rx: &bus::BusReceiver) -> Vec<Payload> {
    rx.try_iter().collect()
}

fn keys_of(payloads: &[Payload]) -> Vec<&[u8]> {
    payloads.iter().map(|p| p.key.as_ref()).collect()
}

/// Answers DUMP for one key with nil, as if it expired right after SCAN
struct Vanishing {
    store: MemoryStore,
    key: &'static [u8],
}

impl Pool for Vanishing {
    fn execute(&self, command: Command) -> Result<Reply, StoreError> {
        if let Command::Dump { key } = &command {
            if key.as_ref() == self.key {
                return Ok(Reply::Nil);
            }
        }
        self.store.execute(command)
    }
}

// =============================================================================
// Publishing Tests
// =============================================================================

#[test]
fn test_publishes_every_key_in_scan_order() {
    let store = Arc::new(store_with(&["a", "b", "c", "d", "e"]));
    let (tx, rx) = bus::channel(16);

    Reader::new(store, tx, &config(false))
        .read(&CancelToken::new())
        .unwrap();

    let payloads = drain(&rx);
    assert_eq!(keys_of(&payloads), vec![b"a", b"b", b"c", b"d", b"e"]);

    for payload in &payloads {
        let value = memstore::decode(&payload.value).unwrap();
        let expected = format!("value-of-{}", String::from_utf8_lossy(&payload.key));
        assert_eq!(value, Bytes::from(expected));
    }

    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
}

#[test]
fn test_empty_source_closes_bus() {
    let (tx, rx) = bus::channel(1);

    Reader::new(Arc::new(MemoryStore::new()), tx, &config(true))
        .read(&CancelToken::new())
        .unwrap();

    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
}

#[test]
fn test_emits_dumped_event_per_key() {
    let store = Arc::new(store_with(&["a", "b"]));
    let recorder = Recorder::new();
    let (tx, _rx) = bus::channel(16);

    Reader::new(store, tx, &config(false))
        .with_progress(recorder.clone())
        .read(&CancelToken::new())
        .unwrap();

    let size = memstore::encode(b"value-of-a").len();
    assert_eq!(
        recorder.events(),
        vec![
            Event::Dumped { key: "a".into(), ttl: "0".into(), size },
            Event::Dumped { key: "b".into(), ttl: "0".into(), size },
        ]
    );
}

#[test]
fn test_quiet_suppresses_dumped_events() {
    let store = Arc::new(store_with(&["a", "b"]));
    let recorder = Recorder::new();
    let (tx, rx) = bus::channel(16);
    let config = Config::builder().quiet(true).build();

    Reader::new(store, tx, &config)
        .with_progress(recorder.clone())
        .read(&CancelToken::new())
        .unwrap();

    assert!(recorder.events().is_empty());
    assert_eq!(drain(&rx).len(), 2);
}

#[test]
fn test_vanished_key_is_skipped() {
    let pool = Arc::new(Vanishing {
        store: store_with(&["a", "b", "c"]),
        key: b"b",
    });
    let (tx, rx) = bus::channel(16);

    Reader::new(pool, tx, &config(false))
        .read(&CancelToken::new())
        .unwrap();

    assert_eq!(keys_of(&drain(&rx)), vec![b"a", b"c"]);
}

// =============================================================================
// TTL Tests
// =============================================================================

#[test]
fn test_ttl_sync_disabled_publishes_zero_without_pttl() {
    let store = Arc::new(MemoryStore::new());
    store.set_with_ttl("short", "v", Duration::from_secs(5));
    store.set("forever", "v");
    let (tx, rx) = bus::channel(16);

    Reader::new(Arc::clone(&store), tx, &config(false))
        .read(&CancelToken::new())
        .unwrap();

    let payloads = drain(&rx);
    assert_eq!(payloads.len(), 2);
    assert!(payloads.iter().all(|p| p.ttl == "0"));
    assert_eq!(store.command_count(CommandType::Pttl), 0);
}

#[test]
fn test_ttl_sync_enabled_resolves_remaining_lifetime() {
    let store = Arc::new(MemoryStore::new());
    store.set_with_ttl("a", "v1", Duration::from_millis(5000));
    store.set("b", "v2");
    let (tx, rx) = bus::channel(16);

    Reader::new(Arc::clone(&store), tx, &config(true))
        .read(&CancelToken::new())
        .unwrap();

    let payloads = drain(&rx);
    let a: i64 = payloads[0].ttl.parse().unwrap();
    assert!(a > 4000 && a <= 5000, "got {a}");
    assert_eq!(payloads[1].ttl, "0");
    assert_eq!(store.command_count(CommandType::Pttl), 2);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_dump_failure_names_key_and_closes_bus() {
    let pool = Arc::new(
        FaultyPool::new(store_with(&["a", "b", "c", "d"])).fail_key(CommandType::Dump, "c"),
    );
    let (tx, rx) = bus::channel(16);

    let err = Reader::new(pool, tx, &config(false))
        .read(&CancelToken::new())
        .unwrap_err();

    match &err {
        MigrateError::Dump { key, .. } => assert_eq!(key, "c"),
        other => panic!("Expected Dump error, got {other:?}"),
    }
    assert!(err.to_string().contains("'c'"));

    assert_eq!(keys_of(&drain(&rx)), vec![b"a", b"b"]);
    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
}

#[test]
fn test_pttl_failure_is_fatal_when_syncing() {
    let pool = Arc::new(FaultyPool::new(store_with(&["a"])).fail(CommandType::Pttl));
    let (tx, rx) = bus::channel(16);

    let err = Reader::new(pool, tx, &config(true))
        .read(&CancelToken::new())
        .unwrap_err();

    assert!(matches!(err, MigrateError::Ttl { ref key, .. } if key == "a"));
    assert!(drain(&rx).is_empty());
}

#[test]
fn test_pttl_failure_irrelevant_without_sync() {
    let pool = Arc::new(FaultyPool::new(store_with(&["a"])).fail(CommandType::Pttl));
    let (tx, rx) = bus::channel(16);

    Reader::new(pool, tx, &config(false))
        .read(&CancelToken::new())
        .unwrap();

    assert_eq!(drain(&rx).len(), 1);
}

#[test]
fn test_scan_failure_surfaces_after_served_keys() {
    let pool = Arc::new(SecondPageFails {
        store: store_with(&["a", "b", "c", "d", "e"]),
    });
    let (tx, rx) = bus::channel(16);

    let err = Reader::new(pool, tx, &config(false))
        .read(&CancelToken::new())
        .unwrap_err();

    assert!(matches!(err, MigrateError::Scan(StoreError::Server(_))));
    assert_eq!(keys_of(&drain(&rx)), vec![b"a", b"b", b"c"]);
}

#[test]
fn test_dropped_receiver_is_an_error() {
    let store = Arc::new(store_with(&["a"]));
    let (tx, rx) = bus::channel(0);
    drop(rx);

    let err = Reader::new(store, tx, &config(false))
        .read(&CancelToken::new())
        .unwrap_err();

    assert!(matches!(err, MigrateError::BusDisconnected));
}

// =============================================================================
// Cancellation Tests
// =============================================================================

#[test]
fn test_stop_before_read_returns_ok_and_publishes_nothing() {
    let store = Arc::new(store_with(&["a", "b"]));
    let recorder = Recorder::new();
    let (tx, rx) = bus::channel(16);
    let cancel = CancelToken::new();
    cancel.stop();

    Reader::new(store, tx, &config(false))
        .with_progress(recorder.clone())
        .read(&cancel)
        .unwrap();

    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    assert_eq!(recorder.events(), vec![Event::Stopped(Side::Reader)]);
}

#[test]
fn test_failure_cause_is_returned_as_error() {
    let store = Arc::new(store_with(&["a"]));
    let (tx, rx) = bus::channel(16);
    let cancel = CancelToken::new();
    cancel.fail("writer crashed");

    let err = Reader::new(store, tx, &cancel_config())
        .read(&cancel)
        .unwrap_err();

    match err {
        MigrateError::Cancelled { cause, .. } => assert_eq!(cause, "writer crashed"),
        other => panic!("Expected Cancelled error, got {other:?}"),
    }
    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
}

fn cancel_config() -> Config {
    Config::builder().quiet(true).build()
}

#[test]
fn test_stop_interrupts_blocked_send() {
    let store = Arc::new(store_with(&["a", "b", "c"]));
    // Rendezvous bus nobody receives from: the first send blocks
    let (tx, rx) = bus::channel(0);
    let cancel = CancelToken::new();

    let reader = {
        let cancel = cancel.clone();
        let reader = Reader::new(store, tx, &config(false));
        thread::spawn(move || reader.read(&cancel))
    };

    thread::sleep(Duration::from_millis(50));
    let started = Instant::now();
    cancel.stop();

    reader.join().unwrap().unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
}

#[test]
fn test_fail_interrupts_blocked_send() {
    let store = Arc::new(store_with(&["a"]));
    let (tx, _rx) = bus::channel(0);
    let cancel = CancelToken::new();

    let reader = {
        let cancel = cancel.clone();
        let reader = Reader::new(store, tx, &config(false));
        thread::spawn(move || reader.read(&cancel))
    };

    thread::sleep(Duration::from_millis(50));
    cancel.fail("deadline exceeded");

    let err = reader.join().unwrap().unwrap_err();
    assert!(matches!(err, MigrateError::Cancelled { .. }));
}
