//! Optimistic Mutation Executor - apply locally, call the backend once, then
//! confirm or roll back.
//!
//! ## Lifecycle
//!
//! ```text
//!   Idle ──apply (sync)──▶ Applied ──remote Ok──▶ Confirmed
//!                             │
//!                             └──remote Err──▶ RolledBack (+ notice)
//! ```
//!
//! Edits and deletes whose target is already gone locally never leave
//! `Idle`; they resolve to [`MutationOutcome::Stale`] without a remote call.

mod executor;
mod notifier;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::EntityId;
use crate::invalidation::CacheKey;

pub use executor::OptimisticExecutor;
#[cfg(feature = "emitter")]
pub use notifier::EmitterNotifier;
pub use notifier::{LogNotifier, Notice, Notifier, NOTICE_EVENT};

/// The user-facing mutations that go through the optimistic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    CreateComment,
    EditComment,
    DeleteComment,
    AddReaction,
    RemoveReaction,
    Subscribe,
    Unsubscribe,
}

impl MutationKind {
    /// Generic message shown to the user when the mutation is rolled back.
    pub fn failure_message(&self) -> &'static str {
        match self {
            MutationKind::CreateComment => "Failed to add comment.",
            MutationKind::EditComment => "Failed to edit comment.",
            MutationKind::DeleteComment => "Failed to delete comment.",
            MutationKind::AddReaction => "Failed to add reaction.",
            MutationKind::RemoveReaction => "Failed to remove reaction.",
            MutationKind::Subscribe => "Failed to subscribe to notifications.",
            MutationKind::Unsubscribe => "Failed to unsubscribe from notifications.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::CreateComment => "create_comment",
            MutationKind::EditComment => "edit_comment",
            MutationKind::DeleteComment => "delete_comment",
            MutationKind::AddReaction => "add_reaction",
            MutationKind::RemoveReaction => "remove_reaction",
            MutationKind::Subscribe => "subscribe",
            MutationKind::Unsubscribe => "unsubscribe",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    Network,
    Validation,
    Unauthorized,
    Other,
}

/// Rejection from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Network, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Validation, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Unauthorized, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Other, message)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RemoteErrorKind::Network => write!(f, "network error: {}", self.message),
            RemoteErrorKind::Validation => write!(f, "validation error: {}", self.message),
            RemoteErrorKind::Unauthorized => write!(f, "unauthorized: {}", self.message),
            RemoteErrorKind::Other => write!(f, "remote error: {}", self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

/// What the backend returned for a successful mutation.
///
/// `id` replaces the temporary id of a created entity; `fields` are
/// server-normalized values merged into the entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Confirmation {
    pub id: Option<EntityId>,
    pub fields: Map<String, Value>,
}

impl Confirmation {
    /// Confirmation without an id or normalized fields.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: EntityId) -> Self {
        Self {
            id: Some(id),
            fields: Map::new(),
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

pub(crate) enum Change<E> {
    Create(E),
    Update {
        id: EntityId,
        update: Box<dyn FnOnce(&E) -> E + Send>,
    },
    Remove(EntityId),
}

/// A single optimistic mutation: the local change plus the cache keys to
/// invalidate once the backend confirms it.
pub struct OptimisticMutation<E> {
    kind: MutationKind,
    change: Change<E>,
    invalidates: Vec<CacheKey>,
}

impl<E> OptimisticMutation<E> {
    /// Insert `draft` (normally carrying a temporary id).
    pub fn create(kind: MutationKind, draft: E) -> Self {
        Self::with_change(kind, Change::Create(draft))
    }

    /// Replace the entity `id` with `update(current)`.
    pub fn update<F>(kind: MutationKind, id: EntityId, update: F) -> Self
    where
        F: FnOnce(&E) -> E + Send + 'static,
    {
        Self::with_change(
            kind,
            Change::Update {
                id,
                update: Box::new(update),
            },
        )
    }

    /// Remove the entity `id`.
    pub fn remove(kind: MutationKind, id: EntityId) -> Self {
        Self::with_change(kind, Change::Remove(id))
    }

    /// Invalidate `key` after the backend confirms the mutation.
    pub fn invalidates(mut self, key: impl Into<CacheKey>) -> Self {
        self.invalidates.push(key.into());
        self
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    fn with_change(kind: MutationKind, change: Change<E>) -> Self {
        Self {
            kind,
            change,
            invalidates: Vec::new(),
        }
    }
}

/// How a mutation attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The backend accepted the mutation; `id` is the confirmed entity id.
    Confirmed { id: EntityId },
    /// The backend rejected the mutation and the local change was reverted.
    RolledBack { error: RemoteError },
    /// The target was no longer present locally; nothing was sent.
    Stale { id: EntityId },
    /// The view was torn down before the backend answered; its store was
    /// left alone.
    Detached { confirmed: bool },
}

impl MutationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, MutationOutcome::Confirmed { .. })
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, MutationOutcome::RolledBack { .. })
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, MutationOutcome::Stale { .. })
    }
}
