//! Resources that comments, reactions and subscriptions attach to.
//!
//! Each parent kind is its own variant, so dispatch on the kind is an
//! exhaustive `match` instead of a tag lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::invalidation::CacheKey;

/// Wire tag of a commentable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentParentType {
    Goal,
    Project,
    Milestone,
    Message,
    GoalUpdate,
    ProjectCheckIn,
    ProjectRetrospective,
    ResourceHubDocument,
    ResourceHubFile,
    ResourceHubLink,
}

impl CommentParentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentParentType::Goal => "goal",
            CommentParentType::Project => "project",
            CommentParentType::Milestone => "milestone",
            CommentParentType::Message => "message",
            CommentParentType::GoalUpdate => "goal_update",
            CommentParentType::ProjectCheckIn => "project_check_in",
            CommentParentType::ProjectRetrospective => "project_retrospective",
            CommentParentType::ResourceHubDocument => "resource_hub_document",
            CommentParentType::ResourceHubFile => "resource_hub_file",
            CommentParentType::ResourceHubLink => "resource_hub_link",
        }
    }
}

impl fmt::Display for CommentParentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource that owns a comment thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum CommentParent {
    Goal(String),
    Project(String),
    Milestone(String),
    Message(String),
    GoalUpdate(String),
    ProjectCheckIn(String),
    ProjectRetrospective(String),
    ResourceHubDocument(String),
    ResourceHubFile(String),
    ResourceHubLink(String),
}

impl CommentParent {
    pub fn id(&self) -> &str {
        match self {
            CommentParent::Goal(id)
            | CommentParent::Project(id)
            | CommentParent::Milestone(id)
            | CommentParent::Message(id)
            | CommentParent::GoalUpdate(id)
            | CommentParent::ProjectCheckIn(id)
            | CommentParent::ProjectRetrospective(id)
            | CommentParent::ResourceHubDocument(id)
            | CommentParent::ResourceHubFile(id)
            | CommentParent::ResourceHubLink(id) => id,
        }
    }

    pub fn parent_type(&self) -> CommentParentType {
        match self {
            CommentParent::Goal(_) => CommentParentType::Goal,
            CommentParent::Project(_) => CommentParentType::Project,
            CommentParent::Milestone(_) => CommentParentType::Milestone,
            CommentParent::Message(_) => CommentParentType::Message,
            CommentParent::GoalUpdate(_) => CommentParentType::GoalUpdate,
            CommentParent::ProjectCheckIn(_) => CommentParentType::ProjectCheckIn,
            CommentParent::ProjectRetrospective(_) => CommentParentType::ProjectRetrospective,
            CommentParent::ResourceHubDocument(_) => CommentParentType::ResourceHubDocument,
            CommentParent::ResourceHubFile(_) => CommentParentType::ResourceHubFile,
            CommentParent::ResourceHubLink(_) => CommentParentType::ResourceHubLink,
        }
    }

    /// Cache key of the parent resource, e.g. `goal-42`.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::resource(self.parent_type().as_str(), self.id())
    }
}

/// Wire tag of a reactable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionEntityType {
    Comment,
    Message,
    GoalUpdate,
    ProjectCheckIn,
    ProjectRetrospective,
    ResourceHubDocument,
}

impl ReactionEntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionEntityType::Comment => "comment",
            ReactionEntityType::Message => "message",
            ReactionEntityType::GoalUpdate => "goal_update",
            ReactionEntityType::ProjectCheckIn => "project_check_in",
            ReactionEntityType::ProjectRetrospective => "project_retrospective",
            ReactionEntityType::ResourceHubDocument => "resource_hub_document",
        }
    }
}

/// The entity a reaction list belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReactionTarget {
    /// A comment; the backend also needs the type of the comment's parent.
    Comment { id: EntityId, parent: CommentParentType },
    Message(String),
    GoalUpdate(String),
    ProjectCheckIn(String),
    ProjectRetrospective(String),
    ResourceHubDocument(String),
}

impl ReactionTarget {
    pub fn entity_id(&self) -> &str {
        match self {
            ReactionTarget::Comment { id, .. } => id.as_str(),
            ReactionTarget::Message(id)
            | ReactionTarget::GoalUpdate(id)
            | ReactionTarget::ProjectCheckIn(id)
            | ReactionTarget::ProjectRetrospective(id)
            | ReactionTarget::ResourceHubDocument(id) => id,
        }
    }

    pub fn entity_type(&self) -> ReactionEntityType {
        match self {
            ReactionTarget::Comment { .. } => ReactionEntityType::Comment,
            ReactionTarget::Message(_) => ReactionEntityType::Message,
            ReactionTarget::GoalUpdate(_) => ReactionEntityType::GoalUpdate,
            ReactionTarget::ProjectCheckIn(_) => ReactionEntityType::ProjectCheckIn,
            ReactionTarget::ProjectRetrospective(_) => ReactionEntityType::ProjectRetrospective,
            ReactionTarget::ResourceHubDocument(_) => ReactionEntityType::ResourceHubDocument,
        }
    }

    /// Parent type sent alongside comment reactions.
    pub fn parent_type(&self) -> Option<CommentParentType> {
        match self {
            ReactionTarget::Comment { parent, .. } => Some(*parent),
            _ => None,
        }
    }

    /// Cache key of the reacted entity, e.g. `comment-c1`.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::resource(self.entity_type().as_str(), self.entity_id())
    }
}

/// Kind of notification subscription list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionType {
    Goal,
    GoalUpdate,
    Message,
    ProjectCheckIn,
    ProjectRetrospective,
    ResourceHubDocument,
    ResourceHubFile,
    ResourceHubLink,
}
