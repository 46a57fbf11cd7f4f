//! EntityList - ordered, immutable collection of entities.

use serde::Serialize;

use super::StoreError;
use crate::entity::{EntityId, StoreEntity};

/// Ordered collection of entities keyed by id.
///
/// Every transition returns a new list and leaves `self` untouched, so a
/// list can serve as the state of any state-holding mechanism. Iteration
/// order is insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EntityList<E> {
    items: Vec<E>,
}

impl<E> Default for EntityList<E> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<E: StoreEntity> EntityList<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from already-loaded entities, rejecting duplicate ids.
    pub fn from_entities(entities: impl IntoIterator<Item = E>) -> Result<Self, StoreError> {
        let mut list = Self::new();
        for entity in entities {
            if list.contains(entity.id()) {
                return Err(StoreError::DuplicateId(entity.id().clone()));
            }
            list.items.push(entity);
        }
        Ok(list)
    }

    /// Append an entity at the end.
    pub fn insert(&self, entity: E) -> Result<Self, StoreError> {
        self.insert_at(self.items.len(), entity)
    }

    /// Insert an entity at `index`, clamped to the current length.
    pub fn insert_at(&self, index: usize, entity: E) -> Result<Self, StoreError> {
        if self.contains(entity.id()) {
            return Err(StoreError::DuplicateId(entity.id().clone()));
        }

        let mut items = self.items.clone();
        items.insert(index.min(items.len()), entity);
        Ok(Self { items })
    }

    /// Apply `updater` to the entity with `id`, keeping its position.
    ///
    /// Returns an unchanged copy when `id` is absent; late or duplicated
    /// responses land here.
    pub fn replace<F>(&self, id: &EntityId, updater: F) -> Self
    where
        F: FnOnce(&E) -> E,
    {
        let mut items = self.items.clone();
        if let Some(slot) = items.iter_mut().find(|entity| entity.id() == id) {
            *slot = updater(slot);
        }
        Self { items }
    }

    /// Remove the entity with `id`; unchanged copy when absent.
    pub fn remove(&self, id: &EntityId) -> Self {
        let items = self
            .items
            .iter()
            .filter(|entity| entity.id() != id)
            .cloned()
            .collect();
        Self { items }
    }

    pub fn find(&self, id: &EntityId) -> Option<&E> {
        self.items.iter().find(|entity| entity.id() == id)
    }

    pub fn position(&self, id: &EntityId) -> Option<usize> {
        self.items.iter().position(|entity| entity.id() == id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.position(id).is_some()
    }

    /// Copy of the list ordered by `key`; ties keep insertion order.
    pub fn sorted_by_key<K, F>(&self, key: F) -> Self
    where
        K: Ord,
        F: FnMut(&E) -> K,
    {
        let mut items = self.items.clone();
        items.sort_by_key(key);
        Self { items }
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.items.iter().map(|entity| entity.id().clone()).collect()
    }
}

impl<E> EntityList<E> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<E> {
        self.items
    }
}

impl<'a, E> IntoIterator for &'a EntityList<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
