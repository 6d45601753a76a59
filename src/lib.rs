//! # cache-manager
//!
//! A pluggable key/value cache for memoizing expensive computations and
//! remote-data fetches, with configurable recency and size bounds.
//!
//! ## Features
//!
//! - **Recency-ordered storage**: the most recently set entry is always
//!   first; re-setting a key moves it back to the front
//! - **Time eviction**: entries older than a configured expiry time are
//!   dropped lazily, on the next operation that would see them
//! - **Size eviction**: a max length truncates the oldest entries when a
//!   brand-new key is inserted
//! - **Customizable matching**: keys compare structurally by default;
//!   a [`CacheCustomizer`] can normalize keys, match fuzzily (ranges,
//!   supersets) and shape returned values per query
//! - **Pluggable persistence**: a [`CacheStorage`] port with in-memory and
//!   serialized-blob adapters; dates and big integers survive the
//!   round-trip through the [`SmartSerializer`] codec
//! - **Named caches**: an explicit [`CacheRegistry`] tracks engines by key
//! - **Memoization**: [`memoize`] wraps any callable over a named cache
//! - **Cache-backed loading**: [`CachedDataLoader`] exposes an observable
//!   single-slot loading state on top of a cache
//!
//! ## Quick start
//!
//! ```
//! use std::time::Duration;
//! use cache_manager::{Cache, CacheParams, MemoryStorage};
//!
//! let mut cache = Cache::new(
//!     MemoryStorage,
//!     CacheParams::new()
//!         .with_expiry_time(Duration::from_secs(300))
//!         .with_max_length(100),
//! )?;
//!
//! cache.set("greeting".to_string(), "hello".to_string())?;
//! assert_eq!(cache.get(&"greeting".to_string()).as_deref(), Some("hello"));
//! # Ok::<(), cache_manager::CacheError>(())
//! ```
//!
//! Concurrency model: engines are single-threaded and synchronous; every
//! operation runs to completion. Callers that share an engine across tasks
//! serialize access themselves (e.g. through a [`SharedRegistry`]).

mod cache;
mod clock;
mod customizer;
mod error;
mod loader;
mod memo;
mod options;
mod registry;
mod serialized_storage;
mod serializer;
mod storage;
mod structural;
mod value;

pub use cache::{Cache, CacheItem, CacheParams};
pub use clock::{Clock, ManualClock, SystemClock};
pub use customizer::{CacheCustomizer, DefaultCustomizer};
pub use error::{CacheError, Result};
pub use loader::{CachedDataLoader, DataState, DataStatus};
pub use memo::{memoize, Memoized};
pub use options::{CacheOption, CacheOptions};
pub use registry::{AnyCache, CacheRegistry, SharedRegistry};
pub use serialized_storage::{InMemoryStringStore, SerializedStorage, StringStore};
pub use serializer::{Serializer, SmartSerializer};
pub use storage::{CacheStorage, MemoryStorage};
pub use structural::StructuralEq;
pub use value::Value;
