use std::future::Future;

use crate::context::ClientContext;
use crate::domain::Subscriber;
use crate::entity::{EntityId, IdError};
use crate::invalidation::CacheKey;
use crate::mutation::{
    Confirmation, MutationKind, MutationOutcome, Notifier, OptimisticMutation, RemoteError,
};
use crate::remote::RemoteApi;
use crate::resource::SubscriptionType;
use crate::store::{EntityList, LocalStore, StoreError};

use super::{refresh_store, RefreshError};

/// The viewer's subscription to one notification list.
///
/// Subscribing inserts the viewer into the subscriber list and
/// unsubscribing removes them; the backend assigns no new id.
pub struct SubscriptionPanel<A, N> {
    ctx: ClientContext<A, N>,
    list_id: String,
    subscription_type: SubscriptionType,
    viewer_id: EntityId,
    store: LocalStore<Subscriber>,
}

impl<A: RemoteApi, N: Notifier> SubscriptionPanel<A, N> {
    pub fn new(
        ctx: ClientContext<A, N>,
        list_id: String,
        subscription_type: SubscriptionType,
        store: LocalStore<Subscriber>,
    ) -> Result<Self, IdError> {
        let viewer_id = EntityId::remote(ctx.viewer().id.clone())?;
        Ok(Self {
            ctx,
            list_id,
            subscription_type,
            viewer_id,
            store,
        })
    }

    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    pub fn subscribers(&self) -> Result<EntityList<Subscriber>, StoreError> {
        self.store.snapshot()
    }

    pub fn is_subscribed(&self) -> Result<bool, StoreError> {
        Ok(self.store.find(&self.viewer_id)?.is_some())
    }

    /// Subscribe the viewer. Resolves to `Stale` without a remote call when
    /// the viewer is already subscribed.
    pub async fn handle_subscribe(&self) -> Result<MutationOutcome, StoreError> {
        if self.is_subscribed()? {
            return Ok(MutationOutcome::Stale {
                id: self.viewer_id.clone(),
            });
        }

        let draft = Subscriber {
            person_id: self.viewer_id.clone(),
            person: self.ctx.viewer().clone(),
            inserted_at: std::time::SystemTime::now(),
        };
        let mutation = OptimisticMutation::create(MutationKind::Subscribe, draft)
            .invalidates(self.cache_key());

        let api = self.ctx.api();
        let list_id = self.list_id.as_str();
        let subscription_type = self.subscription_type;
        self.ctx
            .executor()
            .run(&self.store, mutation, move || async move {
                api.subscribe_to_notifications(list_id, subscription_type)
                    .await?;
                Ok::<_, RemoteError>(Confirmation::new())
            })
            .await
    }

    /// Unsubscribe the viewer; `Stale` when not subscribed.
    pub async fn handle_unsubscribe(&self) -> Result<MutationOutcome, StoreError> {
        let mutation = OptimisticMutation::remove(MutationKind::Unsubscribe, self.viewer_id.clone())
            .invalidates(self.cache_key());

        let api = self.ctx.api();
        let list_id = self.list_id.as_str();
        self.ctx
            .executor()
            .run(&self.store, mutation, move || async move {
                api.unsubscribe_from_notifications(list_id).await?;
                Ok::<_, RemoteError>(Confirmation::new())
            })
            .await
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::resource("subscription_list", &self.list_id)
    }

    pub async fn refresh<F, Fut>(&self, loader: F) -> Result<(), RefreshError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Subscriber>, RemoteError>>,
    {
        refresh_store(&self.store, self.ctx.signal(), &self.cache_key(), loader).await
    }

    pub fn detach(&self) {
        self.store.detach();
    }
}
