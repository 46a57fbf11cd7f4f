use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, PersonRef};
use crate::StoreEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, StoreEntity)]
#[entity(kind = "reaction")]
pub struct Reaction {
    pub id: EntityId,
    pub emoji: String,
    pub person: PersonRef,
    pub inserted_at: SystemTime,
}

impl Reaction {
    pub fn new(id: EntityId, emoji: impl Into<String>, person: PersonRef) -> Self {
        Self {
            id,
            emoji: emoji.into(),
            person,
            inserted_at: SystemTime::now(),
        }
    }
}
