use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{EntityId, PersonRef};
use crate::StoreEntity;

/// A comment in a thread. `content` is the rich-text document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, StoreEntity)]
#[entity(kind = "comment")]
pub struct Comment {
    pub id: EntityId,
    pub content: Value,
    pub author: PersonRef,
    pub inserted_at: SystemTime,
}

impl Comment {
    pub fn new(id: EntityId, content: Value, author: PersonRef) -> Self {
        Self {
            id,
            content,
            author,
            inserted_at: SystemTime::now(),
        }
    }

    /// Whether the comment is still waiting for the backend.
    pub fn is_pending(&self) -> bool {
        self.id.is_temporary()
    }
}
