//! Function memoization over a named cache.
//!
//! [`memoize`] wraps a callable and a key-derivation function into a
//! [`Memoized`] handle. Each call derives a [`Value`] key from the
//! arguments (typically the argument list itself), lazily creates the named
//! cache in a [`SharedRegistry`], and short-circuits to the cached result
//! when the key matches a previous call — structurally, so two argument
//! lists that are built the same way hit the same slot.
//!
//! ```
//! use cache_manager::{memoize, CacheRegistry, Value};
//!
//! let registry = CacheRegistry::shared();
//! let mut calls = 0usize;
//!
//! let mut area = memoize(
//!     registry,
//!     "area",
//!     |(w, h): &(i64, i64)| Value::array([Value::from(*w), Value::from(*h)]),
//!     move |(w, h)| {
//!         calls += 1;
//!         w * h
//!     },
//! );
//!
//! assert_eq!(area.call(&(3, 4))?, 12);
//! assert_eq!(area.call(&(3, 4))?, 12); // served from the cache
//! assert_eq!(area.call(&(5, 5))?, 25);
//! # Ok::<(), cache_manager::CacheError>(())
//! ```

use std::marker::PhantomData;

use tracing::trace;

use crate::cache::{Cache, CacheParams};
use crate::error::{CacheError, Result};
use crate::registry::SharedRegistry;
use crate::value::Value;

/// Wraps `func` so that calls with structurally equal derived keys are
/// served from the cache named `cache_name` in `registry`.
pub fn memoize<Args, R, KeyFn, F>(
    registry: SharedRegistry,
    cache_name: impl Into<String>,
    key_fn: KeyFn,
    func: F,
) -> Memoized<Args, R, KeyFn, F>
where
    R: Clone + 'static,
    KeyFn: Fn(&Args) -> Value,
    F: FnMut(&Args) -> R,
{
    Memoized {
        registry,
        cache_name: cache_name.into(),
        params: Some(CacheParams::new()),
        key_fn,
        func,
        _args: PhantomData,
    }
}

/// A memoized callable; see [`memoize`].
///
/// The named cache is created in the registry on the first call, with the
/// parameters given through [`with_params`](Memoized::with_params). If a
/// cache with that name already exists (created elsewhere, possibly with
/// eviction bounds), it is used as-is.
pub struct Memoized<Args, R, KeyFn, F>
where
    R: Clone + 'static,
    KeyFn: Fn(&Args) -> Value,
    F: FnMut(&Args) -> R,
{
    registry: SharedRegistry,
    cache_name: String,
    params: Option<CacheParams<Value, R>>,
    key_fn: KeyFn,
    func: F,
    _args: PhantomData<fn(&Args)>,
}

impl<Args, R, KeyFn, F> Memoized<Args, R, KeyFn, F>
where
    R: Clone + 'static,
    KeyFn: Fn(&Args) -> Value,
    F: FnMut(&Args) -> R,
{
    /// Cache parameters used when the named cache gets lazily created,
    /// e.g. an expiry time or a max length for the memo slots.
    pub fn with_params(mut self, params: CacheParams<Value, R>) -> Self {
        self.params = Some(params);
        self
    }

    /// Name of the registry entry backing this wrapper.
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    /// Invokes the wrapped function, unless a structurally equal argument
    /// key is cached, in which case the cached result is returned and the
    /// function is not invoked.
    ///
    /// # Errors
    ///
    /// - `CacheError::Configuration` if the registry holds a cache with
    ///   this name but different element types.
    /// - `CacheError::MissingValue` if the cache reports the key present
    ///   but yields no value (storage/customizer inconsistency).
    pub fn call(&mut self, args: &Args) -> Result<R> {
        let key = (self.key_fn)(args);

        let mut registry = self.registry.lock();
        if !registry.has(&self.cache_name) {
            let params = self.params.take().unwrap_or_default();
            registry.create_memory::<Value, R>(&self.cache_name, params)?;
        }
        let cache = self.cache_in(&mut registry)?;

        if cache.has(&key) {
            trace!(cache_name = %self.cache_name, "memoized hit");
            return cache
                .get(&key)
                .ok_or_else(|| CacheError::MissingValue(self.cache_name.clone()));
        }
        drop(registry);

        trace!(cache_name = %self.cache_name, "memoized miss");
        let result = (self.func)(args);

        let mut registry = self.registry.lock();
        let cache = self.cache_in(&mut registry)?;
        cache.set(key, result.clone())?;
        Ok(result)
    }

    fn cache_in<'r>(
        &self,
        registry: &'r mut crate::registry::CacheRegistry,
    ) -> Result<&'r mut Cache<Value, R>> {
        registry.get_mut::<Value, R>(&self.cache_name).ok_or_else(|| {
            CacheError::Configuration(format!(
                "cache {} is registered with different element types",
                self.cache_name
            ))
        })
    }
}
