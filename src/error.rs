//! Error types for the cache engine and its collaborators.
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

/// Unified error type for the cache library.
///
/// Configuration problems are fatal and surfaced at construction time.
/// `DuplicateKey` is recoverable: callers can catch it and fall back to
/// delete-then-set. `MissingValue` signals a storage/customizer
/// inconsistency detected by the memoization wrapper.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Invalid or missing constructor parameters
    #[error("invalid cache configuration: {0}")]
    Configuration(String),

    /// `set` was called for an existing key while throw-on-duplicate is enabled
    #[error("key {0} already exists")]
    DuplicateKey(String),

    /// A key was reported present but no value could be retrieved
    #[error("cache {0} reports the key as present but returned no value")]
    MissingValue(String),

    /// Serialized cache state could not be encoded or decoded
    #[error("failed to encode or decode cached state: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Convenience Result type for the cache library.
pub type Result<T> = std::result::Result<T, CacheError>;
