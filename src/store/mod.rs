//! Local Entity Store - client-visible collections and their transitions.
//!
//! [`EntityList`] holds the pure transition functions (insert, replace,
//! remove, find). [`LocalStore`] is the state holder a view owns.

mod list;
mod local;

use std::fmt;

use crate::entity::EntityId;

pub use list::EntityList;
pub use local::LocalStore;

/// Error type for local store operations.
///
/// Every variant is a programming-invariant violation rather than a
/// user-facing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An insert collided with an id already present.
    DuplicateId(EntityId),
    /// The state lock was poisoned by a panicking writer.
    LockPoisoned(&'static str),
    /// A creation was confirmed without a remote id for its temporary id.
    MissingRemoteId(EntityId),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateId(id) => write!(f, "duplicate entity id {}", id),
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::MissingRemoteId(id) => {
                write!(f, "creation of {} confirmed without a remote id", id)
            }
        }
    }
}

impl std::error::Error for StoreError {}
