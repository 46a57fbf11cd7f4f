use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Deserializer, Serialize};

/// Reserved namespace for client-allocated ids.
///
/// Remote ids are refused if they start with this prefix, so a temporary
/// id can never collide with a confirmed one.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Identifier of an entity held in a local store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap an id assigned by the remote system.
    pub fn remote(id: impl Into<String>) -> Result<Self, IdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(IdError::Empty);
        }
        if id.starts_with(TEMP_ID_PREFIX) {
            return Err(IdError::ReservedPrefix(id));
        }
        Ok(EntityId(id))
    }

    /// Whether this id was allocated client-side and is awaiting confirmation.
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityId {
    type Error = IdError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        EntityId::remote(id)
    }
}

/// Deserialize an id assigned by the remote system, refusing empty ids and
/// the reserved temporary namespace.
///
/// Entities themselves deserialize ids verbatim since pending entities carry
/// temporary ids; use this on fields that only ever hold remote ids.
pub fn deserialize_remote_id<'de, D>(deserializer: D) -> Result<EntityId, D::Error>
where
    D: Deserializer<'de>,
{
    let id = String::deserialize(deserializer)?;
    EntityId::try_from(id).map_err(serde::de::Error::custom)
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error returned when a remote id cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty,
    ReservedPrefix(String),
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdError::Empty => write!(f, "entity id must not be empty"),
            IdError::ReservedPrefix(id) => write!(
                f,
                "remote id {} uses the reserved prefix {}",
                id, TEMP_ID_PREFIX
            ),
        }
    }
}

impl std::error::Error for IdError {}

/// Hands out `temp-<n>` ids, unique for the lifetime of the allocator.
#[derive(Debug)]
pub struct TempIdAllocator {
    seq: AtomicU64,
}

impl TempIdAllocator {
    pub fn new() -> Self {
        TempIdAllocator {
            seq: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> EntityId {
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        EntityId(format!("{}{}", TEMP_ID_PREFIX, n))
    }
}

impl Default for TempIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
