//! QueryCache - read-through cache that honours invalidation hints.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::debug;

use super::{CacheKey, InvalidationSignal};
use crate::mutation::RemoteError;

struct CachedEntry<T> {
    value: T,
    fetched_at: Instant,
}

/// Caches the result of remote reads per key.
///
/// A read is served from the cache unless the key is missing, has been
/// invalidated through the shared [`InvalidationSignal`], or is older than
/// the optional TTL. A successful load clears the staleness flag; a failed
/// load leaves it set.
pub struct QueryCache<T> {
    signal: InvalidationSignal,
    entries: RwLock<HashMap<CacheKey, CachedEntry<T>>>,
    ttl: Option<Duration>,
}

impl<T: Clone> QueryCache<T> {
    pub fn new(signal: InvalidationSignal) -> Self {
        Self {
            signal,
            entries: RwLock::new(HashMap::new()),
            ttl: None,
        }
    }

    /// Expire entries `ttl` after they were fetched.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn signal(&self) -> &InvalidationSignal {
        &self.signal
    }

    /// Cached value for `key` if it is still usable.
    pub fn peek(&self, key: &CacheKey) -> Option<T> {
        if self.signal.is_stale(key) {
            return None;
        }
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| !self.is_expired(entry))
            .map(|entry| entry.value.clone())
    }

    /// Return the cached value or run `loader` to refetch it.
    pub async fn fetch<F, Fut>(&self, key: &CacheKey, loader: F) -> Result<T, RemoteError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        if let Some(value) = self.peek(key) {
            return Ok(value);
        }

        debug!(key = %key, "refetching cache entry");
        let generation = self.signal.generation(key);
        let value = loader().await?;

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                key.clone(),
                CachedEntry {
                    value: value.clone(),
                    fetched_at: Instant::now(),
                },
            );
        if !self.signal.mark_fresh_since(key, generation) {
            debug!(key = %key, "invalidated during refetch, key stays stale");
        }

        Ok(value)
    }

    /// Drop the cached value for `key`.
    pub fn evict(&self, key: &CacheKey) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    fn is_expired(&self, entry: &CachedEntry<T>) -> bool {
        self.ttl
            .map(|ttl| entry.fetched_at.elapsed() >= ttl)
            .unwrap_or(false)
    }
}
