use std::future::Future;

use crate::context::ClientContext;
use crate::domain::Reaction;
use crate::entity::EntityId;
use crate::invalidation::CacheKey;
use crate::mutation::{
    Confirmation, MutationKind, MutationOutcome, Notifier, OptimisticMutation, RemoteError,
};
use crate::remote::RemoteApi;
use crate::resource::ReactionTarget;
use crate::store::{EntityList, LocalStore, StoreError};

use super::{refresh_store, RefreshError};

/// Reactions attached to one entity.
pub struct ReactionList<A, N> {
    ctx: ClientContext<A, N>,
    target: ReactionTarget,
    store: LocalStore<Reaction>,
}

impl<A: RemoteApi, N: Notifier> ReactionList<A, N> {
    pub fn new(ctx: ClientContext<A, N>, target: ReactionTarget, store: LocalStore<Reaction>) -> Self {
        Self { ctx, target, store }
    }

    pub fn target(&self) -> &ReactionTarget {
        &self.target
    }

    pub fn reactions(&self) -> Result<EntityList<Reaction>, StoreError> {
        self.store.snapshot()
    }

    /// React with `emoji` as the viewer.
    pub async fn handle_add_reaction(&self, emoji: &str) -> Result<MutationOutcome, StoreError> {
        let draft = Reaction::new(
            self.ctx.executor().allocate_temp_id(),
            emoji,
            self.ctx.viewer().clone(),
        );
        let mutation = OptimisticMutation::create(MutationKind::AddReaction, draft)
            .invalidates(self.cache_key());

        let api = self.ctx.api();
        let target = &self.target;
        self.ctx
            .executor()
            .run(&self.store, mutation, move || async move {
                let added = api.add_reaction(target, emoji).await?;
                Ok::<_, RemoteError>(Confirmation::with_id(added.id))
            })
            .await
    }

    pub async fn handle_remove_reaction(&self, id: &EntityId) -> Result<MutationOutcome, StoreError> {
        let mutation = OptimisticMutation::remove(MutationKind::RemoveReaction, id.clone())
            .invalidates(self.cache_key());

        let api = self.ctx.api();
        self.ctx
            .executor()
            .run(&self.store, mutation, move || async move {
                api.remove_reaction(id).await?;
                Ok::<_, RemoteError>(Confirmation::new())
            })
            .await
    }

    pub fn cache_key(&self) -> CacheKey {
        self.target.cache_key()
    }

    pub async fn refresh<F, Fut>(&self, loader: F) -> Result<(), RefreshError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Reaction>, RemoteError>>,
    {
        refresh_store(&self.store, self.ctx.signal(), &self.cache_key(), loader).await
    }

    pub fn detach(&self) {
        self.store.detach();
    }
}
