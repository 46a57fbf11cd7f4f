//! Entities held by local stores.
//!
//! Every entity carries an [`EntityId`]. Entities created optimistically
//! start out with a temporary id from [`TempIdAllocator`] and receive their
//! remote id once the backend confirms the mutation.

mod id;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use id::{deserialize_remote_id, EntityId, IdError, TempIdAllocator, TEMP_ID_PREFIX};

/// Trait for types that can live in a [`LocalStore`](crate::LocalStore).
///
/// Usually derived with `#[derive(StoreEntity)]`.
pub trait StoreEntity: Clone + Serialize + DeserializeOwned {
    /// Entity kind used in log fields (e.g. "comment", "reaction").
    const KIND: &'static str;

    fn id(&self) -> &EntityId;

    fn set_id(&mut self, id: EntityId);
}

/// Weak reference to a person owned by the People collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

impl PersonRef {
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            avatar_url: None,
        }
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

/// Merge server-normalized fields into an entity.
///
/// The entity is round-tripped through its JSON form; keys present in
/// `fields` overwrite the entity's own. The id is never taken from `fields`.
pub fn merge_fields<E: StoreEntity>(
    entity: &E,
    fields: &Map<String, Value>,
) -> Result<E, serde_json::Error> {
    if fields.is_empty() {
        return Ok(entity.clone());
    }

    let mut value = serde_json::to_value(entity)?;
    if let Value::Object(object) = &mut value {
        for (key, field) in fields {
            object.insert(key.clone(), field.clone());
        }
    }

    let mut merged: E = serde_json::from_value(value)?;
    merged.set_id(entity.id().clone());
    Ok(merged)
}
