//! Cache-backed single-slot data loading.
//!
//! A [`CachedDataLoader`] sits between a consumer and a slow physical
//! loader (a fetch, a query, an expensive computation). It holds exactly
//! one [`DataState`] at a time and replays every transition to its
//! subscribers: `Inactive` until the first load, `Loading` while the
//! physical loader runs, then `Ok` or `Error`. Cache hits jump straight to
//! `Ok` without invoking the physical loader; physical results are written
//! back through the cache so the next load of the same key is a hit.
//!
//! ```
//! use cache_manager::{Cache, CachedDataLoader, CacheParams, DataStatus, MemoryStorage};
//!
//! let cache = Cache::new(MemoryStorage, CacheParams::new())?;
//! let mut loader = CachedDataLoader::new(cache, |city: &String| {
//!     Ok(format!("forecast for {city}"))
//! });
//!
//! loader.load("paris".to_string());
//! assert_eq!(loader.state().status, DataStatus::Ok);
//! assert_eq!(loader.state().data.as_deref(), Some("forecast for paris"));
//! # Ok::<(), cache_manager::CacheError>(())
//! ```

use std::fmt::Debug;

use tracing::trace;

use crate::cache::Cache;
use crate::structural::StructuralEq;

/// Phase of the single data slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataStatus {
    /// No load has happened (or the last one was cancelled).
    Inactive,
    /// The physical loader is running.
    Loading,
    /// Data is available.
    Ok,
    /// The physical loader failed.
    Error,
}

/// The loader's observable state: a status plus data or an error message.
#[derive(Clone, Debug)]
pub struct DataState<V> {
    pub status: DataStatus,
    pub data: Option<V>,
    pub error: Option<String>,
}

impl<V> DataState<V> {
    pub fn inactive() -> Self {
        Self {
            status: DataStatus::Inactive,
            data: None,
            error: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            status: DataStatus::Loading,
            data: None,
            error: None,
        }
    }

    pub fn ok(data: Option<V>) -> Self {
        Self {
            status: DataStatus::Ok,
            data,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: DataStatus::Error,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == DataStatus::Loading
    }
}

type PhysicalLoader<K, V> = Box<dyn FnMut(&K) -> std::result::Result<V, String>>;
type Subscriber<V> = Box<dyn FnMut(&DataState<V>)>;

/// Single-slot asynchronous-style data loader built atop a cache.
///
/// The loader owns its cache; [`cache_mut`](CachedDataLoader::cache_mut)
/// exposes it for direct manipulation (pre-seeding, invalidation).
pub struct CachedDataLoader<K, V> {
    cache: Cache<K, V>,
    physical_loader: PhysicalLoader<K, V>,
    state: DataState<V>,
    subscribers: Vec<Subscriber<V>>,
}

impl<K, V> CachedDataLoader<K, V>
where
    K: Clone + StructuralEq + Debug,
    V: Clone,
{
    /// Binds a cache and a physical loader. The loader starts `Inactive`.
    pub fn new(
        cache: Cache<K, V>,
        physical_loader: impl FnMut(&K) -> std::result::Result<V, String> + 'static,
    ) -> Self {
        Self {
            cache,
            physical_loader: Box::new(physical_loader),
            state: DataState::inactive(),
            subscribers: Vec::new(),
        }
    }

    /// Subscribes to state transitions. The subscriber immediately
    /// receives the current state, then every transition after it.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&DataState<V>) + 'static) {
        let mut subscriber = Box::new(subscriber);
        subscriber(&self.state);
        self.subscribers.push(subscriber);
    }

    /// The current state of the slot.
    pub fn state(&self) -> &DataState<V> {
        &self.state
    }

    /// The underlying cache.
    pub fn cache_mut(&mut self) -> &mut Cache<K, V> {
        &mut self.cache
    }

    /// Loads data for `key`: from the cache when present, otherwise through
    /// the physical loader (emitting `Loading` first and writing the result
    /// back to the cache).
    pub fn load(&mut self, key: K) {
        if self.cache.has(&key) {
            let data = self.cache.get(&key);
            self.transition(DataState::ok(data));
            return;
        }

        self.transition(DataState::loading());
        match (self.physical_loader)(&key) {
            Ok(data) => {
                if let Err(err) = self.cache.set(key, data.clone()) {
                    self.transition(DataState::error(err.to_string()));
                } else {
                    self.transition(DataState::ok(Some(data)));
                }
            }
            Err(message) => self.transition(DataState::error(message)),
        }
    }

    /// Resets the slot to `Inactive`.
    pub fn cancel(&mut self) {
        self.transition(DataState::inactive());
    }

    fn transition(&mut self, state: DataState<V>) {
        trace!(status = ?state.status, "loader transition");
        self.state = state;
        for subscriber in &mut self.subscribers {
            subscriber(&self.state);
        }
    }
}
