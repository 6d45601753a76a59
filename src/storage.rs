//! The storage port.
//!
//! A [`CacheStorage`] is where an engine's item list survives (or doesn't)
//! between engine lifetimes. The engine reads the list exactly once at
//! construction and rewrites it completely after every mutation; the port
//! decides representation and durability. [`MemoryStorage`] is the trivial
//! adapter for purely transient caches; [`SerializedStorage`]
//! (`crate::SerializedStorage`) persists the list as a serialized blob.

use crate::cache::CacheItem;

/// Persistence port used by the cache engine.
///
/// Contract:
/// - `read_from_storage` is called once, at engine construction. It must
///   return an empty list (never fail) when no prior state exists.
/// - `write_to_storage` is called after every mutation with the complete
///   current list. Adapters that can fail must cope without corrupting the
///   engine's in-memory list (log and keep the previous representation).
pub trait CacheStorage<K, V> {
    /// Restores the previously persisted item list, most recent first.
    fn read_from_storage(&mut self) -> Vec<CacheItem<K, V>>;

    /// Persists the complete current item list, most recent first.
    fn write_to_storage(&mut self, items: &[CacheItem<K, V>]);
}

/// Storage for purely in-memory caches.
///
/// The engine's owned list is the only copy: reads restore nothing and
/// writes are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryStorage;

impl<K, V> CacheStorage<K, V> for MemoryStorage {
    fn read_from_storage(&mut self) -> Vec<CacheItem<K, V>> {
        Vec::new()
    }

    fn write_to_storage(&mut self, _items: &[CacheItem<K, V>]) {}
}
