//! Named cache instances.
//!
//! A [`CacheRegistry`] creates and tracks engines by string key so that
//! distant call sites can share one cache without sharing a variable. The
//! registry is an explicit object with a controlled lifecycle: create it
//! once, pass it by reference (or as a [`SharedRegistry`]) to whoever needs
//! it. Nothing here is process-global.
//!
//! Entries are type-erased; retrieval names the element types and fails
//! softly (`None`) when they don't match what was registered.
//!
//! ```
//! use cache_manager::{CacheParams, CacheRegistry};
//!
//! let mut registry = CacheRegistry::new();
//! let cache = registry.create_memory::<String, i32>("scores", CacheParams::new())?;
//! cache.set("alice".to_string(), 40)?;
//!
//! assert!(registry.has("scores"));
//! let cache = registry.get_mut::<String, i32>("scores").unwrap();
//! assert_eq!(cache.get(&"alice".to_string()), Some(40));
//!
//! assert!(registry.remove("scores"));
//! assert!(!registry.has("scores"));
//! # Ok::<(), cache_manager::CacheError>(())
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{Cache, CacheParams};
use crate::error::{CacheError, Result};
use crate::serialized_storage::{SerializedStorage, StringStore};
use crate::storage::MemoryStorage;
use crate::structural::StructuralEq;
use crate::value::Value;

/// Object-safe view of a cache of any element types.
pub trait AnyCache {
    /// Empties the cache (persisting the empty list).
    fn clear(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<K: 'static, V: 'static> AnyCache for Cache<K, V> {
    fn clear(&mut self) {
        Cache::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A shareable registry handle for collaborators that hold the registry
/// across calls, like the memoization wrapper.
pub type SharedRegistry = Arc<Mutex<CacheRegistry>>;

/// Maps string cache keys to engine instances.
#[derive(Default)]
pub struct CacheRegistry {
    caches: HashMap<String, Box<dyn AnyCache>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a fresh registry in a [`SharedRegistry`] handle.
    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Creates and registers a memory-backed cache under `cache_key`,
    /// replacing any previous entry with that key.
    pub fn create_memory<K, V>(
        &mut self,
        cache_key: &str,
        params: CacheParams<K, V>,
    ) -> Result<&mut Cache<K, V>>
    where
        K: Clone + StructuralEq + Debug + 'static,
        V: Clone + 'static,
    {
        let cache = Cache::new(MemoryStorage, params)?;
        self.register(cache_key, cache);
        self.get_mut(cache_key)
            .ok_or_else(|| registration_lost(cache_key))
    }

    /// Creates and registers a serialized cache under `cache_key`. The
    /// registry key doubles as the blob storage key inside `store`.
    pub fn create_serialized(
        &mut self,
        cache_key: &str,
        store: impl StringStore + 'static,
        params: CacheParams<Value, Value>,
    ) -> Result<&mut Cache<Value, Value>> {
        let storage = SerializedStorage::new(store, cache_key);
        let cache = Cache::new(storage, params)?;
        self.register(cache_key, cache);
        self.get_mut(cache_key)
            .ok_or_else(|| registration_lost(cache_key))
    }

    /// Registers a pre-built engine under `cache_key`, replacing any
    /// previous entry with that key.
    pub fn register<K: 'static, V: 'static>(&mut self, cache_key: &str, cache: Cache<K, V>) {
        debug!(cache_key, "registering cache");
        self.caches.insert(cache_key.to_string(), Box::new(cache));
    }

    /// Returns true if a cache is registered under `cache_key`.
    pub fn has(&self, cache_key: &str) -> bool {
        self.caches.contains_key(cache_key)
    }

    /// Retrieves a registered cache. `None` if the key is unknown or the
    /// registered cache has different element types.
    pub fn get_mut<K: 'static, V: 'static>(&mut self, cache_key: &str) -> Option<&mut Cache<K, V>> {
        self.caches
            .get_mut(cache_key)?
            .as_any_mut()
            .downcast_mut::<Cache<K, V>>()
    }

    /// Clears the cache registered under `cache_key`, then drops the
    /// registry entry. Returns whether an entry existed.
    ///
    /// Clearing first matters for persisted caches: their backing blob is
    /// removed along with the registration.
    pub fn remove(&mut self, cache_key: &str) -> bool {
        match self.caches.get_mut(cache_key) {
            Some(cache) => {
                cache.clear();
                self.caches.remove(cache_key);
                debug!(cache_key, "removed cache");
                true
            }
            None => false,
        }
    }

    /// Number of registered caches.
    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}

fn registration_lost(cache_key: &str) -> CacheError {
    CacheError::Configuration(format!(
        "cache {cache_key} disappeared during registration"
    ))
}
