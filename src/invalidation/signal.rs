//! InvalidationSignal - process-wide staleness hints with synchronous fan-out.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tracing::debug;

use super::CacheKey;

type Listener = Arc<dyn Fn(&CacheKey) + Send + Sync>;

#[derive(Default)]
struct SignalState {
    /// Stale keys, each with the generation of its latest invalidation.
    /// Entries are dropped on refetch, so only keys that are invalidated
    /// and never read again stay behind for the life of the session.
    stale: RwLock<HashMap<CacheKey, u64>>,
    listeners: RwLock<HashMap<CacheKey, Vec<(u64, Listener)>>>,
    next_listener: AtomicU64,
    next_generation: AtomicU64,
}

/// Tells dependent views that the remote source of truth behind a cache key
/// changed.
///
/// `invalidate` only marks the key stale and notifies listeners; refetching
/// is up to the reader. A key stays stale until [`mark_fresh`](Self::mark_fresh)
/// is called after a successful refetch. Readers that refetch
/// asynchronously take a [`generation`](Self::generation) first and clear
/// staleness with [`mark_fresh_since`](Self::mark_fresh_since), so an
/// invalidation that lands while the read is in flight is kept. Clones
/// share the same state.
#[derive(Clone, Default)]
pub struct InvalidationSignal {
    state: Arc<SignalState>,
}

impl InvalidationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` stale and invoke every active listener for it, once each.
    pub fn invalidate(&self, key: &CacheKey) {
        let generation = self.state.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.state
            .stale
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), generation);

        // Listeners run outside the lock so they may register or cancel.
        let listeners: Vec<Listener> = self
            .state
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();

        debug!(key = %key, listeners = listeners.len(), "cache key invalidated");

        for listener in listeners {
            listener(key);
        }
    }

    /// Register a callback for `key`, active until the returned
    /// [`Registration`] is dropped or cancelled.
    pub fn on_invalidate<F>(&self, key: impl Into<CacheKey>, callback: F) -> Registration
    where
        F: Fn(&CacheKey) + Send + Sync + 'static,
    {
        let key = key.into();
        let id = self.state.next_listener.fetch_add(1, Ordering::Relaxed);

        self.state
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .push((id, Arc::new(callback)));

        Registration {
            state: Arc::downgrade(&self.state),
            key,
            id,
        }
    }

    pub fn is_stale(&self, key: &CacheKey) -> bool {
        self.state
            .stale
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Generation of the latest invalidation of `key`; `0` when fresh.
    ///
    /// Take it before starting a refetch and hand it to
    /// [`mark_fresh_since`](Self::mark_fresh_since) afterwards.
    pub fn generation(&self, key: &CacheKey) -> u64 {
        self.state
            .stale
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Clear staleness unconditionally.
    pub fn mark_fresh(&self, key: &CacheKey) {
        self.state
            .stale
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Clear staleness after a refetch that started at `generation`.
    ///
    /// Returns `false` and leaves the key stale if it was invalidated again
    /// after the refetch started.
    pub fn mark_fresh_since(&self, key: &CacheKey, generation: u64) -> bool {
        let mut stale = self
            .state
            .stale
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match stale.get(key) {
            Some(latest) if *latest > generation => false,
            _ => {
                stale.remove(key);
                true
            }
        }
    }

    /// Number of active registrations for `key`.
    pub fn listener_count(&self, key: &CacheKey) -> usize {
        self.state
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// Active listener registration. Dropping it unregisters the callback.
#[must_use = "dropping a Registration unregisters the callback immediately"]
pub struct Registration {
    state: Weak<SignalState>,
    key: CacheKey,
    id: u64,
}

impl Registration {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Unregister explicitly.
    pub fn cancel(self) {}
}

impl Drop for Registration {
    fn drop(&mut self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let mut listeners = state
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(entries) = listeners.get_mut(&self.key) {
            entries.retain(|(id, _)| *id != self.id);
            if entries.is_empty() {
                listeners.remove(&self.key);
            }
        }
    }
}
