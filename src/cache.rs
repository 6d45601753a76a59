//! The cache engine.
//!
//! [`Cache`] owns an ordered item list (most recently set first), evicts by
//! age and by length, and mirrors every mutation through its storage port.
//! It is storage-agnostic: bind it to [`MemoryStorage`](crate::MemoryStorage)
//! for a transient cache or to
//! [`SerializedStorage`](crate::SerializedStorage) for a persisted one.
//!
//! # Operation protocol
//!
//! Every operation that reveals length or looks anything up first drops the
//! items whose age reached the configured expiry time, persisting
//! immediately when something was dropped. Only then does the requested
//! operation run. Max-length eviction happens on insertion of a brand-new
//! key: the list is truncated from the tail, discarding the oldest entries.
//!
//! # Quick start
//!
//! ```
//! use cache_manager::{Cache, CacheParams, MemoryStorage};
//!
//! let mut cache = Cache::new(MemoryStorage, CacheParams::new().with_max_length(2))?;
//!
//! cache.set("a".to_string(), 1)?;
//! cache.set("b".to_string(), 2)?;
//! cache.set("c".to_string(), 3)?;
//!
//! // "a" was the oldest of the three and fell off.
//! assert!(!cache.has(&"a".to_string()));
//! assert_eq!(cache.get(&"c".to_string()), Some(3));
//! assert_eq!(cache.len(), 2);
//! # Ok::<(), cache_manager::CacheError>(())
//! ```

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::customizer::{CacheCustomizer, DefaultCustomizer};
use crate::error::{CacheError, Result};
use crate::options::{CacheOption, CacheOptions};
use crate::storage::CacheStorage;
use crate::structural::StructuralEq;

/// One cached entry: a key, its value, and the moment of its most recent
/// `set` in epoch milliseconds. Re-setting a key resets `inserted_at`.
#[derive(Clone, Debug)]
pub struct CacheItem<K, V> {
    pub key: K,
    pub value: V,
    pub inserted_at: u64,
}

/// Construction parameters for a [`Cache`].
///
/// All parameters are optional; `CacheParams::new()` describes a cache with
/// no eviction, structural key matching and no cloning.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cache_manager::{CacheOption, CacheParams};
///
/// let params: CacheParams<String, i32> = CacheParams::new()
///     .with_expiry_time(Duration::from_secs(60))
///     .with_max_length(100)
///     .with_options(CacheOption::CloneValue | CacheOption::ThrowIfExists);
/// ```
pub struct CacheParams<K, V> {
    pub(crate) expiry_time: Option<Duration>,
    pub(crate) max_length: Option<usize>,
    pub(crate) customizer: Option<Box<dyn CacheCustomizer<K, V>>>,
    pub(crate) options: CacheOptions,
    pub(crate) clock: Option<Arc<dyn Clock>>,
}

impl<K, V> Default for CacheParams<K, V> {
    fn default() -> Self {
        Self {
            expiry_time: None,
            max_length: None,
            customizer: None,
            options: CacheOptions::NONE,
            clock: None,
        }
    }
}

impl<K, V> CacheParams<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries whose age reaches this duration are evicted lazily.
    /// Must be non-zero; absent means no time-based eviction.
    pub fn with_expiry_time(mut self, expiry_time: Duration) -> Self {
        self.expiry_time = Some(expiry_time);
        self
    }

    /// Upper bound on the number of retained entries. Must be non-zero;
    /// absent means no size-based eviction.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Key matching / processing strategy. Defaults to
    /// [`DefaultCustomizer`](crate::DefaultCustomizer).
    pub fn with_customizer(mut self, customizer: impl CacheCustomizer<K, V> + 'static) -> Self {
        self.customizer = Some(Box::new(customizer));
        self
    }

    /// Behavior options; see [`CacheOption`].
    pub fn with_options(mut self, options: impl Into<CacheOptions>) -> Self {
        self.options = options.into();
        self
    }

    /// Time source, defaults to [`SystemClock`]. Tests inject a
    /// [`ManualClock`](crate::ManualClock) to pin eviction boundaries.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }
}

/// A key/value cache with recency ordering, lazy time eviction, max-length
/// eviction and pluggable persistence.
///
/// The engine exclusively owns its item list for its lifetime; the storage
/// port only mirrors it. Lookup behavior is controlled by
/// [`CacheOptions`] and the [`CacheCustomizer`]:
///
/// - **Fuzzy match** (default): the query key is pre-processed by the
///   customizer and compared with `customizer.compare`, which defaults to
///   deep structural equality.
/// - **Exact match** (`CacheOption::ExactMatch`): the raw query key is
///   compared with the raw stored key using structural equality. The
///   customizer is bypassed entirely, including its key pre-processing.
pub struct Cache<K, V> {
    storage: Box<dyn CacheStorage<K, V>>,
    customizer: Box<dyn CacheCustomizer<K, V>>,
    expiry_time: Option<Duration>,
    max_length: Option<usize>,
    options: CacheOptions,
    clock: Arc<dyn Clock>,
    items: Vec<CacheItem<K, V>>,
}

impl<K, V> Cache<K, V>
where
    K: Clone + StructuralEq + Debug,
    V: Clone,
{
    /// Creates an engine bound to a storage port.
    ///
    /// The item list is loaded from storage exactly once, here. Entries
    /// that already outlived the expiry time or the max length are pruned
    /// immediately and the pruned list is written back.
    ///
    /// # Errors
    ///
    /// `CacheError::Configuration` if `expiry_time` or `max_length` is
    /// present but zero. Zero bounds are meaningless, not "unlimited".
    pub fn new(storage: impl CacheStorage<K, V> + 'static, params: CacheParams<K, V>) -> Result<Self> {
        if let Some(expiry_time) = params.expiry_time {
            if expiry_time.is_zero() {
                return Err(CacheError::Configuration(
                    "expiry_time must be greater than zero if provided".to_string(),
                ));
            }
        }
        if params.max_length == Some(0) {
            return Err(CacheError::Configuration(
                "max_length must be greater than zero if provided".to_string(),
            ));
        }

        let mut storage: Box<dyn CacheStorage<K, V>> = Box::new(storage);
        let items = storage.read_from_storage();

        let mut cache = Self {
            storage,
            customizer: params
                .customizer
                .unwrap_or_else(|| Box::new(DefaultCustomizer)),
            expiry_time: params.expiry_time,
            max_length: params.max_length,
            options: params.options,
            clock: params.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            items,
        };

        let expired = cache.evict_expired();
        let truncated = cache.truncate_to_max_length();
        if expired || truncated {
            cache.save();
        }

        Ok(cache)
    }

    /// Returns true if a matching key is cached (and not expired).
    pub fn has(&mut self, key: &K) -> bool {
        if self.evict_expired() {
            self.save();
        }
        self.find_index(key).is_some()
    }

    /// Retrieves the value for a matching key, shaped by the customizer's
    /// post-processing relative to the exact query key.
    pub fn get(&mut self, key: &K) -> Option<V> {
        if self.evict_expired() {
            self.save();
        }
        let index = self.find_index(key)?;
        let value = self.items[index].value.clone();
        Some(self.customizer.post_process_value(value, key))
    }

    /// Inserts a key/value pair at the most-recent position.
    ///
    /// A matching existing key is replaced (its recency resets to the
    /// front) unless `CacheOption::ThrowIfExists` is set, in which case a
    /// duplicate fails without mutating the list. Max-length eviction only
    /// runs when the key is brand new: a replace never changes the length.
    ///
    /// # Errors
    ///
    /// `CacheError::DuplicateKey` on an existing key under the
    /// throw-on-duplicate policy.
    pub fn set(&mut self, key: K, value: V) -> Result<()> {
        if self.evict_expired() {
            self.save();
        }

        let existing = self.find_index(&key);
        if let Some(index) = existing {
            if self.options.has(CacheOption::ThrowIfExists) {
                return Err(CacheError::DuplicateKey(key_string(&key)));
            }
            self.items.remove(index);
        }

        let candidate = if self.options.has(CacheOption::CloneKey) {
            self.customizer.clone_key(&key)
        } else {
            key
        };
        let key_to_store = self.customizer.pre_process_key(candidate, &*self);
        let value_to_store = if self.options.has(CacheOption::CloneValue) {
            self.customizer.clone_value(&value)
        } else {
            value
        };

        let inserted_at = self.clock.now_millis();
        trace!(key = ?key_to_store, replaced = existing.is_some(), "caching entry");
        self.items.insert(
            0,
            CacheItem {
                key: key_to_store,
                value: value_to_store,
                inserted_at,
            },
        );

        if existing.is_none() {
            self.truncate_to_max_length();
        }
        self.save();
        Ok(())
    }

    /// Removes the first matching item. Returns whether anything was
    /// removed.
    pub fn delete(&mut self, key: &K) -> bool {
        if self.evict_expired() {
            self.save();
        }
        match self.find_index(key) {
            Some(index) => {
                self.items.remove(index);
                self.save();
                true
            }
            None => false,
        }
    }

    /// Index of the first item matching `query`, in recency order, so the
    /// most-recently-set matching entry wins on ties.
    fn find_index(&self, query: &K) -> Option<usize> {
        if self.options.has(CacheOption::ExactMatch) {
            self.items
                .iter()
                .position(|item| item.key.structural_eq(query))
        } else {
            let prepared = self.customizer.pre_process_key(query.clone(), self);
            self.items
                .iter()
                .position(|item| self.customizer.compare(&item.key, &prepared))
        }
    }
}

impl<K, V> Cache<K, V> {
    /// Number of live entries. Expired entries are evicted before counting.
    pub fn len(&mut self) -> usize {
        if self.evict_expired() {
            self.save();
        }
        self.items.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Visits every live item in recency order; index 0 is the most
    /// recently set entry.
    pub fn for_each<F>(&mut self, mut visit: F)
    where
        F: FnMut(&CacheItem<K, V>, usize),
    {
        if self.evict_expired() {
            self.save();
        }
        for (index, item) in self.items.iter().enumerate() {
            visit(item, index);
        }
    }

    /// Empties the cache and persists the empty list unconditionally.
    pub fn clear(&mut self) {
        debug!(dropped = self.items.len(), "clearing cache");
        self.items.clear();
        self.save();
    }

    pub fn options(&self) -> CacheOptions {
        self.options
    }

    pub fn expiry_time(&self) -> Option<Duration> {
        self.expiry_time
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Drops every item whose age reached the expiry time. Returns whether
    /// anything was dropped; callers persist when it was.
    fn evict_expired(&mut self) -> bool {
        let Some(expiry_time) = self.expiry_time else {
            return false;
        };
        let expiry_millis = expiry_time.as_millis() as u64;
        let now = self.clock.now_millis();

        let before = self.items.len();
        self.items
            .retain(|item| now.saturating_sub(item.inserted_at) < expiry_millis);
        let evicted = before - self.items.len();
        if evicted > 0 {
            debug!(evicted, "evicted expired entries");
        }
        evicted > 0
    }

    /// Truncates the list to the configured max length, discarding the
    /// oldest overflow. Returns whether anything was discarded.
    fn truncate_to_max_length(&mut self) -> bool {
        if let Some(max_length) = self.max_length {
            if self.items.len() > max_length {
                debug!(discarded = self.items.len() - max_length, "length eviction");
                self.items.truncate(max_length);
                return true;
            }
        }
        false
    }

    fn save(&mut self) {
        self.storage.write_to_storage(&self.items);
    }
}

/// String form of a key for error messages: short keys verbatim, composite
/// dumps truncated.
fn key_string<K: Debug>(key: &K) -> String {
    let dump = format!("{key:?}");
    if dump.chars().count() > 99 {
        dump.chars().take(99).collect()
    } else {
        dump
    }
}
