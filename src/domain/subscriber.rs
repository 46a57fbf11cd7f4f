use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, IdError, PersonRef};
use crate::StoreEntity;

/// A person subscribed to a notification list.
///
/// Subscribers are keyed by the person's id; being present in the list is
/// the subscription flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, StoreEntity)]
#[entity(kind = "subscriber")]
pub struct Subscriber {
    #[entity(id)]
    pub person_id: EntityId,
    pub person: PersonRef,
    pub inserted_at: SystemTime,
}

impl Subscriber {
    pub fn for_person(person: PersonRef) -> Result<Self, IdError> {
        Ok(Self {
            person_id: EntityId::remote(person.id.clone())?,
            person,
            inserted_at: SystemTime::now(),
        })
    }
}
