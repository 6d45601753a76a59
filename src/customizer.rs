//! Key matching and value shaping strategy.
//!
//! A [`CacheCustomizer`] decides how candidate keys are normalized before
//! storage and lookup, how a stored key matches a query key, and how a
//! stored value is shaped before it is handed back. The default behaves
//! like a plain cache: structural key equality, identity pre/post
//! processing, `Clone` for the clone-on-write options.
//!
//! Overriding `compare` and `post_process_value` together enables superset
//! caching: a broad cached key (say a wide date range) can serve narrower
//! queries, with the returned value filtered down to the query's actual
//! bounds.

use crate::cache::Cache;
use crate::structural::StructuralEq;

/// Pluggable key pre-processing, key comparison and value post-processing.
///
/// Every method has a default, so an implementation only overrides the
/// behavior it cares about:
///
/// ```
/// use cache_manager::CacheCustomizer;
///
/// /// Matches when the query number is covered by the stored number.
/// struct AtLeast;
///
/// impl CacheCustomizer<i64, Vec<i64>> for AtLeast {
///     fn compare(&self, stored: &i64, query: &i64) -> bool {
///         query <= stored
///     }
///
///     fn post_process_value(&self, value: Vec<i64>, query_key: &i64) -> Vec<i64> {
///         value.into_iter().take(*query_key as usize).collect()
///     }
/// }
/// ```
pub trait CacheCustomizer<K, V> {
    /// Clones a key for the `CloneKey` option. Override to detach shared
    /// state or normalize while copying.
    fn clone_key(&self, key: &K) -> K
    where
        K: Clone,
    {
        key.clone()
    }

    /// Clones a value for the `CloneValue` option.
    fn clone_value(&self, value: &V) -> V
    where
        V: Clone,
    {
        value.clone()
    }

    /// Returns true if the stored key satisfies the query key. The default
    /// is deep structural equality; fuzzy customizers may treat a narrower
    /// query as matching a broader stored key.
    fn compare(&self, stored: &K, query: &K) -> bool
    where
        K: StructuralEq,
    {
        stored.structural_eq(query)
    }

    /// Normalizes a key before it is stored or (in fuzzy mode) looked up.
    /// The engine is available read-only so derived customizers can consult
    /// its configuration.
    fn pre_process_key(&self, key: K, cache: &Cache<K, V>) -> K {
        let _ = cache;
        key
    }

    /// Shapes a stored value relative to the exact query that retrieved it.
    fn post_process_value(&self, value: V, query_key: &K) -> V {
        let _ = query_key;
        value
    }
}

/// Identity pass-through customizer with deep structural comparison.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCustomizer;

impl<K, V> CacheCustomizer<K, V> for DefaultCustomizer {}
