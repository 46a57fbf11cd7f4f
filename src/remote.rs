//! Boundary to the backend API.
//!
//! The crate never talks to the network itself. Callers implement
//! [`RemoteApi`] on top of their generated client; tests implement it with
//! scripted responses.

use std::future::Future;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::EntityId;
use crate::mutation::RemoteError;
use crate::resource::{CommentParent, CommentParentType, ReactionTarget, SubscriptionType};

/// Response of `create_comment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedComment {
    #[serde(deserialize_with = "crate::entity::deserialize_remote_id")]
    pub id: EntityId,
    pub inserted_at: SystemTime,
    /// Content as normalized by the server.
    pub content: Value,
}

/// Response of `edit_comment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditedComment {
    pub content: Value,
}

/// Response of `add_reaction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddedReaction {
    #[serde(deserialize_with = "crate::entity::deserialize_remote_id")]
    pub id: EntityId,
}

/// Mutating calls consumed by the optimistic handlers.
///
/// Every call is fallible. Handlers issue each call at most once per
/// invocation and never retry.
pub trait RemoteApi {
    fn create_comment(
        &self,
        parent: &CommentParent,
        content: &Value,
    ) -> impl Future<Output = Result<CreatedComment, RemoteError>>;

    fn edit_comment(
        &self,
        comment_id: &EntityId,
        parent_type: CommentParentType,
        content: &Value,
    ) -> impl Future<Output = Result<EditedComment, RemoteError>>;

    fn delete_comment(
        &self,
        comment_id: &EntityId,
        parent_type: CommentParentType,
    ) -> impl Future<Output = Result<(), RemoteError>>;

    fn add_reaction(
        &self,
        target: &ReactionTarget,
        emoji: &str,
    ) -> impl Future<Output = Result<AddedReaction, RemoteError>>;

    fn remove_reaction(
        &self,
        reaction_id: &EntityId,
    ) -> impl Future<Output = Result<(), RemoteError>>;

    fn subscribe_to_notifications(
        &self,
        list_id: &str,
        subscription_type: SubscriptionType,
    ) -> impl Future<Output = Result<(), RemoteError>>;

    fn unsubscribe_from_notifications(
        &self,
        list_id: &str,
    ) -> impl Future<Output = Result<(), RemoteError>>;
}
