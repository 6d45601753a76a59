//! End-to-end eviction behavior: time-based expiry with an injected clock,
//! max-length truncation, and recency ordering.

use std::sync::Arc;
use std::time::Duration;

use cache_manager::{Cache, CacheParams, ManualClock, MemoryStorage};

fn timed_cache(clock: &Arc<ManualClock>, expiry: Duration) -> Cache<String, i32> {
    Cache::new(
        MemoryStorage,
        CacheParams::new()
            .with_expiry_time(expiry)
            .with_clock(clock.clone()),
    )
    .unwrap()
}

#[test]
fn test_entry_survives_until_the_expiry_boundary() {
    let clock = Arc::new(ManualClock::new(0));
    let mut cache = timed_cache(&clock, Duration::from_secs(1));
    cache.set("k".to_string(), 1).unwrap();

    clock.set(999);
    assert!(cache.has(&"k".to_string()));
    assert_eq!(cache.get(&"k".to_string()), Some(1));

    // At exactly the expiry age the entry is gone.
    clock.set(1_000);
    assert!(!cache.has(&"k".to_string()));
    assert_eq!(cache.get(&"k".to_string()), None);
}

#[test]
fn test_expiry_is_lazy_but_observable_through_every_operation() {
    let clock = Arc::new(ManualClock::new(0));
    let mut cache = timed_cache(&clock, Duration::from_secs(1));
    cache.set("a".to_string(), 1).unwrap();
    cache.set("b".to_string(), 2).unwrap();

    clock.set(1_250);
    // Nothing has touched the cache since the entries aged out; the first
    // operation that looks must not see them.
    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());

    let mut visited = 0;
    cache.for_each(|_, _| visited += 1);
    assert_eq!(visited, 0);
}

#[test]
fn test_resetting_a_key_restarts_its_age() {
    let clock = Arc::new(ManualClock::new(0));
    let mut cache = timed_cache(&clock, Duration::from_secs(1));
    cache.set("k".to_string(), 1).unwrap();

    clock.set(800);
    cache.set("k".to_string(), 2).unwrap();

    // 1600ms after the first set, but only 800ms after the refresh.
    clock.set(1_600);
    assert_eq!(cache.get(&"k".to_string()), Some(2));

    clock.set(1_800);
    assert!(!cache.has(&"k".to_string()));
}

#[test]
fn test_entries_expire_individually() {
    let clock = Arc::new(ManualClock::new(0));
    let mut cache = timed_cache(&clock, Duration::from_secs(1));
    cache.set("old".to_string(), 1).unwrap();

    clock.set(600);
    cache.set("young".to_string(), 2).unwrap();

    clock.set(1_100);
    assert!(!cache.has(&"old".to_string()));
    assert!(cache.has(&"young".to_string()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_max_length_discards_the_oldest_entries() {
    let mut cache: Cache<String, i32> =
        Cache::new(MemoryStorage, CacheParams::new().with_max_length(2)).unwrap();
    cache.set("k1".to_string(), 1).unwrap();
    cache.set("k2".to_string(), 2).unwrap();
    cache.set("k3".to_string(), 3).unwrap();

    assert_eq!(cache.len(), 2);
    assert!(!cache.has(&"k1".to_string()));

    let mut order = Vec::new();
    cache.for_each(|item, _| order.push(item.key.clone()));
    assert_eq!(order, vec!["k3".to_string(), "k2".to_string()]);
}

#[test]
fn test_six_inserts_into_a_cache_of_five() {
    let mut cache: Cache<i32, i32> =
        Cache::new(MemoryStorage, CacheParams::new().with_max_length(5)).unwrap();
    for n in 1..=6 {
        cache.set(n, n * 10).unwrap();
    }

    assert_eq!(cache.len(), 5);
    assert!(!cache.has(&1));
    for n in 2..=6 {
        assert_eq!(cache.get(&n), Some(n * 10));
    }
}

#[test]
fn test_refreshed_key_is_safe_from_length_eviction() {
    let mut cache: Cache<String, i32> =
        Cache::new(MemoryStorage, CacheParams::new().with_max_length(3)).unwrap();
    cache.set("a".to_string(), 1).unwrap();
    cache.set("b".to_string(), 2).unwrap();
    cache.set("c".to_string(), 3).unwrap();

    // Touch "a" so it is the most recent, then overflow once.
    cache.set("a".to_string(), 10).unwrap();
    cache.set("d".to_string(), 4).unwrap();

    // "b" was the oldest at overflow time, not "a".
    assert!(!cache.has(&"b".to_string()));
    assert_eq!(cache.get(&"a".to_string()), Some(10));
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_time_and_length_eviction_compose() {
    let clock = Arc::new(ManualClock::new(0));
    let mut cache: Cache<String, i32> = Cache::new(
        MemoryStorage,
        CacheParams::new()
            .with_expiry_time(Duration::from_secs(1))
            .with_max_length(2)
            .with_clock(clock.clone()),
    )
    .unwrap();

    cache.set("a".to_string(), 1).unwrap();
    clock.set(950);
    cache.set("b".to_string(), 2).unwrap();

    // "a" ages out; the cache has room again before "c" arrives.
    clock.set(1_100);
    cache.set("c".to_string(), 3).unwrap();

    assert_eq!(cache.len(), 2);
    assert!(cache.has(&"b".to_string()));
    assert!(cache.has(&"c".to_string()));
}
