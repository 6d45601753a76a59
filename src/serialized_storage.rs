//! Persistence through a string key/value store.
//!
//! [`SerializedStorage`] implements the engine's storage port on top of any
//! [`StringStore`] — the Rust shape of a browser-storage-like API: named
//! text slots with read, write and remove. The whole item list lives in one
//! slot as a [`SmartSerializer`] blob; an empty list removes the slot
//! entirely.
//!
//! [`InMemoryStringStore`] is the reference store. Tests and embedders that
//! need to look inside the store while an engine owns it can share it via
//! `Rc<RefCell<_>>` or `Arc<Mutex<_>>`, both of which forward the trait.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, warn};

use crate::cache::CacheItem;
use crate::serializer::{Serializer, SmartSerializer};
use crate::storage::CacheStorage;
use crate::value::Value;

/// A named-slot text store: the persistence medium under a serialized cache.
pub trait StringStore {
    /// Returns the text stored under `key`, if any.
    fn read(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous text.
    fn write(&mut self, key: &str, value: &str);

    /// Drops the slot `key`, if present.
    fn remove(&mut self, key: &str);
}

/// A process-local [`StringStore`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryStringStore {
    slots: HashMap<String, String>,
}

impl InMemoryStringStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl StringStore for InMemoryStringStore {
    fn read(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) {
        self.slots.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.slots.remove(key);
    }
}

/// Single-threaded shared handle; lets a caller keep inspecting a store
/// after handing it to an engine.
impl<S: StringStore> StringStore for Rc<RefCell<S>> {
    fn read(&self, key: &str) -> Option<String> {
        self.borrow().read(key)
    }

    fn write(&mut self, key: &str, value: &str) {
        self.borrow_mut().write(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.borrow_mut().remove(key);
    }
}

/// Thread-safe shared handle.
impl<S: StringStore> StringStore for Arc<Mutex<S>> {
    fn read(&self, key: &str) -> Option<String> {
        self.lock().read(key)
    }

    fn write(&mut self, key: &str, value: &str) {
        self.lock().write(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.lock().remove(key);
    }
}

/// Storage port adapter that persists the item list as one serialized blob
/// under a fixed storage key.
///
/// Read failures are not the engine's problem: unreadable or missing prior
/// state loads as an empty list (with a warning), never as an error.
/// Write failures keep the previous blob in place.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use cache_manager::{
///     Cache, CacheParams, InMemoryStringStore, SerializedStorage, Value,
/// };
///
/// let store = Rc::new(RefCell::new(InMemoryStringStore::new()));
///
/// let mut cache = Cache::new(
///     SerializedStorage::new(Rc::clone(&store), "weather"),
///     CacheParams::new(),
/// )?;
/// cache.set(Value::from("london"), Value::from(11))?;
/// drop(cache);
///
/// // A second engine over the same store restores the entry.
/// let mut cache = Cache::new(
///     SerializedStorage::new(store, "weather"),
///     CacheParams::new(),
/// )?;
/// assert_eq!(cache.get(&Value::from("london")), Some(Value::from(11)));
/// # Ok::<(), cache_manager::CacheError>(())
/// ```
pub struct SerializedStorage {
    store: Box<dyn StringStore>,
    storage_key: String,
    serializer: Box<dyn Serializer>,
}

impl SerializedStorage {
    /// Binds a store slot with the default [`SmartSerializer`] codec.
    pub fn new(store: impl StringStore + 'static, storage_key: impl Into<String>) -> Self {
        Self::with_serializer(store, storage_key, SmartSerializer)
    }

    /// Binds a store slot with a custom codec.
    pub fn with_serializer(
        store: impl StringStore + 'static,
        storage_key: impl Into<String>,
        serializer: impl Serializer + 'static,
    ) -> Self {
        Self {
            store: Box::new(store),
            storage_key: storage_key.into(),
            serializer: Box::new(serializer),
        }
    }
}

impl CacheStorage<Value, Value> for SerializedStorage {
    fn read_from_storage(&mut self) -> Vec<CacheItem<Value, Value>> {
        let Some(raw) = self.store.read(&self.storage_key) else {
            return Vec::new();
        };
        match self.serializer.deserialize(&raw) {
            Ok(items) => items,
            Err(err) => {
                warn!(
                    storage_key = %self.storage_key,
                    %err,
                    "discarding unreadable cached state"
                );
                Vec::new()
            }
        }
    }

    fn write_to_storage(&mut self, items: &[CacheItem<Value, Value>]) {
        if items.is_empty() {
            self.store.remove(&self.storage_key);
            return;
        }
        match self.serializer.serialize(items) {
            Ok(raw) => self.store.write(&self.storage_key, &raw),
            Err(err) => {
                error!(
                    storage_key = %self.storage_key,
                    %err,
                    "failed to serialize cache state; previous blob kept"
                );
            }
        }
    }
}
