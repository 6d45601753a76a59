//! Persistence through the serialized storage adapter: state survives
//! engine restarts, dates and big integers round-trip, and the backing
//! slot is removed once the cache empties.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use cache_manager::{
    Cache, CacheParams, InMemoryStringStore, ManualClock, SerializedStorage, StringStore, Value,
};

type SharedStore = Rc<RefCell<InMemoryStringStore>>;

fn shared_store() -> SharedStore {
    Rc::new(RefCell::new(InMemoryStringStore::new()))
}

fn persisted_cache(store: &SharedStore, params: CacheParams<Value, Value>) -> Cache<Value, Value> {
    Cache::new(SerializedStorage::new(Rc::clone(store), "forecast"), params).unwrap()
}

#[test]
fn test_state_survives_an_engine_restart() {
    let store = shared_store();

    let mut cache = persisted_cache(&store, CacheParams::new());
    cache.set(Value::from("london"), Value::from(11)).unwrap();
    cache.set(Value::from("oslo"), Value::from(-3)).unwrap();
    drop(cache);

    let mut cache = persisted_cache(&store, CacheParams::new());
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get(&Value::from("london")), Some(Value::from(11)));
    assert_eq!(cache.get(&Value::from("oslo")), Some(Value::from(-3)));

    // Recency order survives too.
    let mut keys = Vec::new();
    cache.for_each(|item, _| keys.push(item.key.clone()));
    assert_eq!(keys, vec![Value::from("oslo"), Value::from("london")]);
}

#[test]
fn test_dates_and_big_integers_round_trip() {
    let store = shared_store();
    let date = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
    let big = Value::BigInt(9_223_372_036_854_775_808_i128); // i64::MAX + 1

    let mut cache = persisted_cache(&store, CacheParams::new());
    cache
        .set(
            Value::from("snapshot"),
            Value::object([
                ("taken_at", Value::from(date)),
                ("total", big.clone()),
                ("note", Value::from("@starts with a marker")),
            ]),
        )
        .unwrap();
    drop(cache);

    let mut cache = persisted_cache(&store, CacheParams::new());
    let restored = cache.get(&Value::from("snapshot")).unwrap();
    assert_eq!(restored.get("taken_at"), Some(&Value::Date(date)));
    assert_eq!(restored.get("total"), Some(&big));
    // Strings that merely look like escapes come back verbatim.
    assert_eq!(
        restored.get("note"),
        Some(&Value::from("@starts with a marker"))
    );
}

#[test]
fn test_emptying_the_cache_removes_the_slot() {
    let store = shared_store();
    let mut cache = persisted_cache(&store, CacheParams::new());
    cache.set(Value::from("k"), Value::from(1)).unwrap();
    assert_eq!(store.borrow().len(), 1);

    assert!(cache.delete(&Value::from("k")));
    assert!(store.borrow().is_empty());
}

#[test]
fn test_clear_removes_the_slot() {
    let store = shared_store();
    let mut cache = persisted_cache(&store, CacheParams::new());
    cache.set(Value::from("k"), Value::from(1)).unwrap();

    cache.clear();
    assert!(store.borrow().is_empty());
}

#[test]
fn test_expiry_of_the_last_entry_removes_the_slot() {
    let clock = Arc::new(ManualClock::new(0));
    let store = shared_store();
    let mut cache = persisted_cache(
        &store,
        CacheParams::new()
            .with_expiry_time(Duration::from_secs(1))
            .with_clock(clock.clone()),
    );
    cache.set(Value::from("k"), Value::from(1)).unwrap();
    assert_eq!(store.borrow().len(), 1);

    clock.set(1_250);
    assert_eq!(cache.len(), 0);
    assert!(store.borrow().is_empty());
}

#[test]
fn test_restart_prunes_persisted_entries_that_aged_out() {
    let clock = Arc::new(ManualClock::new(0));
    let store = shared_store();

    let mut cache = persisted_cache(
        &store,
        CacheParams::new()
            .with_expiry_time(Duration::from_secs(1))
            .with_clock(clock.clone()),
    );
    cache.set(Value::from("stale"), Value::from(1)).unwrap();
    drop(cache);

    // The process "comes back" well past the expiry time.
    clock.set(10_000);
    let mut cache = persisted_cache(
        &store,
        CacheParams::new()
            .with_expiry_time(Duration::from_secs(1))
            .with_clock(clock.clone()),
    );
    assert_eq!(cache.len(), 0);
    assert!(store.borrow().is_empty());
}

#[test]
fn test_corrupt_slot_starts_an_empty_cache() {
    let store = shared_store();
    store.borrow_mut().write("forecast", "garbage {{{ not json");

    let mut cache = persisted_cache(&store, CacheParams::new());
    assert_eq!(cache.len(), 0);

    // The cache is fully usable afterwards.
    cache.set(Value::from("k"), Value::from(1)).unwrap();
    assert_eq!(cache.get(&Value::from("k")), Some(Value::from(1)));
}
