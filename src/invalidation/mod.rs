//! Cache Invalidation Signal - decouples "a mutation succeeded" from "cached
//! reads of that resource are stale".
//!
//! ## Example
//!
//! ```ignore
//! use optimistic_rust::{CacheKey, InvalidationSignal};
//!
//! let signal = InvalidationSignal::new();
//! let _registration = signal.on_invalidate("goal-42", |key| {
//!     println!("{} changed, refetch on next read", key);
//! });
//!
//! signal.invalidate(&CacheKey::new("goal-42"));
//! ```

mod query_cache;
mod signal;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use query_cache::QueryCache;
pub use signal::{InvalidationSignal, Registration};

/// Name of a cached read, e.g. `goal-42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        CacheKey(key.into())
    }

    /// Key for a single resource, `<kind>-<id>`.
    pub fn resource(kind: &str, id: &str) -> Self {
        CacheKey(format!("{}-{}", kind, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        CacheKey::new(key)
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        CacheKey(key)
    }
}
