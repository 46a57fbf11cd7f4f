// Lets `#[derive(StoreEntity)]` resolve `optimistic_rust::` paths inside this crate.
extern crate self as optimistic_rust;

mod config;
mod context;
mod domain;
mod entity;
mod handlers;
mod invalidation;
mod mutation;
mod remote;
mod resource;
mod store;

pub use config::{ClientConfig, ConfigError};
pub use context::{ClientContext, PanelError};
pub use domain::{Comment, Reaction, Subscriber};
pub use entity::{
    deserialize_remote_id, merge_fields, EntityId, IdError, PersonRef, StoreEntity,
    TempIdAllocator, TEMP_ID_PREFIX,
};
pub use handlers::{CommentThread, ReactionList, RefreshError, SubscriptionPanel};
pub use invalidation::{CacheKey, InvalidationSignal, QueryCache, Registration};
#[cfg(feature = "emitter")]
pub use mutation::EmitterNotifier;
pub use mutation::{
    Confirmation, LogNotifier, MutationKind, MutationOutcome, Notice, Notifier,
    OptimisticExecutor, OptimisticMutation, RemoteError, RemoteErrorKind, NOTICE_EVENT,
};
pub use remote::{AddedReaction, CreatedComment, EditedComment, RemoteApi};
pub use resource::{
    CommentParent, CommentParentType, ReactionEntityType, ReactionTarget, SubscriptionType,
};
pub use store::{EntityList, LocalStore, StoreError};

// Derive macro for `StoreEntity`
pub use optimistic_rust_macros::StoreEntity;

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
