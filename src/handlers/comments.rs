use std::future::Future;

use serde_json::Value;

use crate::context::ClientContext;
use crate::domain::Comment;
use crate::entity::EntityId;
use crate::invalidation::{CacheKey, Registration};
use crate::mutation::{
    Confirmation, MutationKind, MutationOutcome, Notifier, OptimisticMutation, RemoteError,
};
use crate::remote::RemoteApi;
use crate::resource::CommentParent;
use crate::store::{EntityList, LocalStore, StoreError};

use super::{refresh_store, RefreshError};

/// Comment thread of a single commentable resource.
pub struct CommentThread<A, N> {
    ctx: ClientContext<A, N>,
    parent: CommentParent,
    store: LocalStore<Comment>,
}

impl<A: RemoteApi, N: Notifier> CommentThread<A, N> {
    pub fn new(ctx: ClientContext<A, N>, parent: CommentParent, store: LocalStore<Comment>) -> Self {
        Self { ctx, parent, store }
    }

    pub fn parent(&self) -> &CommentParent {
        &self.parent
    }

    pub fn store(&self) -> &LocalStore<Comment> {
        &self.store
    }

    /// Comments in display order.
    pub fn comments(&self) -> Result<EntityList<Comment>, StoreError> {
        self.store.snapshot()
    }

    /// Post a new comment authored by the viewer.
    pub async fn handle_create_comment(&self, content: Value) -> Result<MutationOutcome, StoreError> {
        let draft = Comment::new(
            self.ctx.executor().allocate_temp_id(),
            content.clone(),
            self.ctx.viewer().clone(),
        );
        let mutation = OptimisticMutation::create(MutationKind::CreateComment, draft)
            .invalidates(self.parent.cache_key());

        let api = self.ctx.api();
        let parent = &self.parent;
        self.ctx
            .executor()
            .run(&self.store, mutation, move || async move {
                let created = api.create_comment(parent, &content).await?;
                let mut confirmation =
                    Confirmation::with_id(created.id).field("content", created.content);
                if let Ok(inserted_at) = serde_json::to_value(created.inserted_at) {
                    confirmation = confirmation.field("inserted_at", inserted_at);
                }
                Ok::<_, RemoteError>(confirmation)
            })
            .await
    }

    /// Replace the content of comment `id`.
    pub async fn handle_edit_comment(
        &self,
        id: &EntityId,
        content: Value,
    ) -> Result<MutationOutcome, StoreError> {
        let edited = content.clone();
        let mutation =
            OptimisticMutation::update(MutationKind::EditComment, id.clone(), move |comment: &Comment| {
                Comment {
                    content: edited,
                    ..comment.clone()
                }
            })
            .invalidates(self.parent.cache_key());

        let api = self.ctx.api();
        let parent_type = self.parent.parent_type();
        self.ctx
            .executor()
            .run(&self.store, mutation, move || async move {
                let edited = api.edit_comment(id, parent_type, &content).await?;
                Ok::<_, RemoteError>(Confirmation::new().field("content", edited.content))
            })
            .await
    }

    pub async fn handle_delete_comment(&self, id: &EntityId) -> Result<MutationOutcome, StoreError> {
        let mutation = OptimisticMutation::remove(MutationKind::DeleteComment, id.clone())
            .invalidates(self.parent.cache_key());

        let api = self.ctx.api();
        let parent_type = self.parent.parent_type();
        self.ctx
            .executor()
            .run(&self.store, mutation, move || async move {
                api.delete_comment(id, parent_type).await?;
                Ok::<_, RemoteError>(Confirmation::new())
            })
            .await
    }

    /// Cache key invalidated by this thread's mutations.
    pub fn cache_key(&self) -> CacheKey {
        self.parent.cache_key()
    }

    /// Call `callback` whenever the parent resource is invalidated.
    pub fn on_stale<F>(&self, callback: F) -> Registration
    where
        F: Fn(&CacheKey) + Send + Sync + 'static,
    {
        self.ctx.signal().on_invalidate(self.cache_key(), callback)
    }

    pub fn is_stale(&self) -> bool {
        self.ctx.signal().is_stale(&self.cache_key())
    }

    /// Reload the thread from the backend. Comments by other people only
    /// arrive this way.
    pub async fn refresh<F, Fut>(&self, loader: F) -> Result<(), RefreshError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Comment>, RemoteError>>,
    {
        refresh_store(&self.store, self.ctx.signal(), &self.cache_key(), loader).await
    }

    /// Tear down the view; in-flight mutations stop touching its store.
    pub fn detach(&self) {
        self.store.detach();
    }
}
