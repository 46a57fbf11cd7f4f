//! LocalStore - shared handle to the client-visible state of one view.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::{EntityList, StoreError};
use crate::entity::{EntityId, StoreEntity};

/// Holds the current [`EntityList`] of a single view.
///
/// Clone-friendly via Arc; clones observe the same state. A store is
/// attached while its view is alive. Once [`detach`](Self::detach) is
/// called, in-flight mutations stop reconciling against it.
pub struct LocalStore<E> {
    state: Arc<RwLock<EntityList<E>>>,
    attached: Arc<AtomicBool>,
}

impl<E> Clone for LocalStore<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            attached: Arc::clone(&self.attached),
        }
    }
}

impl<E: StoreEntity> Default for LocalStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: StoreEntity> LocalStore<E> {
    /// Create an empty, attached store.
    pub fn new() -> Self {
        Self::with_list(EntityList::new())
    }

    pub fn with_list(list: EntityList<E>) -> Self {
        Self {
            state: Arc::new(RwLock::new(list)),
            attached: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Create a store from loaded entities.
    pub fn from_entities(entities: impl IntoIterator<Item = E>) -> Result<Self, StoreError> {
        Ok(Self::with_list(EntityList::from_entities(entities)?))
    }

    /// Current state.
    pub fn snapshot(&self) -> Result<EntityList<E>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(state.clone())
    }

    pub fn find(&self, id: &EntityId) -> Result<Option<E>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(state.find(id).cloned())
    }

    /// Run a transition atomically against the current state.
    ///
    /// The closure returns the next state plus a value handed back to the
    /// caller. Readers see either the old or the new state, never a mix.
    /// When the closure fails the state is left unchanged.
    pub fn transition<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&EntityList<E>) -> Result<(EntityList<E>, T), StoreError>,
    {
        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        let (next, value) = f(&*state)?;
        *state = next;
        Ok(value)
    }

    /// Replace the whole collection, e.g. after a refetch.
    pub fn reset(&self, list: EntityList<E>) -> Result<(), StoreError> {
        self.transition(|_| Ok((list, ())))
    }

    /// Mark the owning view as torn down.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}
