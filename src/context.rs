//! ClientContext - the explicit bundle of shared client state.
//!
//! Everything a view needs (API client, executor, invalidation signal,
//! enabled-features cache, the signed-in person) is passed through this
//! context instead of living in module-level globals.

use std::future::Future;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::domain::{Comment, Reaction, Subscriber};
use crate::entity::{IdError, PersonRef};
use crate::handlers::{CommentThread, ReactionList, SubscriptionPanel};
use crate::invalidation::{CacheKey, InvalidationSignal, QueryCache};
use crate::mutation::{Notifier, OptimisticExecutor, RemoteError};
use crate::remote::RemoteApi;
use crate::resource::{CommentParent, ReactionTarget, SubscriptionType};
use crate::store::{LocalStore, StoreError};

/// Shared client state. Cheap to clone.
pub struct ClientContext<A, N> {
    api: Arc<A>,
    executor: Arc<OptimisticExecutor<N>>,
    features: Arc<QueryCache<Vec<String>>>,
    viewer: PersonRef,
}

impl<A, N> Clone for ClientContext<A, N> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            executor: Arc::clone(&self.executor),
            features: Arc::clone(&self.features),
            viewer: self.viewer.clone(),
        }
    }
}

impl<A, N> ClientContext<A, N> {
    pub fn new(api: A, notifier: N, viewer: PersonRef, config: &ClientConfig) -> Self {
        let signal = InvalidationSignal::new();
        let executor = OptimisticExecutor::new(notifier, signal.clone())
            .with_failure_notices(config.notify_failures);
        let features = QueryCache::new(signal).with_ttl(config.feature_ttl());

        Self {
            api: Arc::new(api),
            executor: Arc::new(executor),
            features: Arc::new(features),
            viewer,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn executor(&self) -> &OptimisticExecutor<N> {
        &self.executor
    }

    pub fn signal(&self) -> &InvalidationSignal {
        self.executor.signal()
    }

    /// The signed-in person, author of optimistic entities.
    pub fn viewer(&self) -> &PersonRef {
        &self.viewer
    }

    /// Enabled features of a company, served from cache while fresh.
    pub async fn enabled_features<F, Fut>(
        &self,
        company_id: &str,
        loader: F,
    ) -> Result<Vec<String>, RemoteError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<String>, RemoteError>>,
    {
        self.features.fetch(&features_key(company_id), loader).await
    }

    /// Whether `feature` is enabled according to the cached list.
    ///
    /// Returns `false` when nothing usable is cached.
    pub fn has_feature(&self, company_id: &str, feature: &str) -> bool {
        self.features
            .peek(&features_key(company_id))
            .map(|features| features.iter().any(|f| f == feature))
            .unwrap_or(false)
    }

    /// Force the next `enabled_features` call to refetch.
    pub fn invalidate_features(&self, company_id: &str) {
        self.signal().invalidate(&features_key(company_id));
    }
}

impl<A: RemoteApi, N: Notifier> ClientContext<A, N> {
    /// Comment thread of `parent`, seeded with already-loaded comments.
    pub fn comment_thread(
        &self,
        parent: CommentParent,
        comments: Vec<Comment>,
    ) -> Result<CommentThread<A, N>, StoreError> {
        Ok(CommentThread::new(
            self.clone(),
            parent,
            LocalStore::from_entities(comments)?,
        ))
    }

    pub fn reaction_list(
        &self,
        target: ReactionTarget,
        reactions: Vec<Reaction>,
    ) -> Result<ReactionList<A, N>, StoreError> {
        Ok(ReactionList::new(
            self.clone(),
            target,
            LocalStore::from_entities(reactions)?,
        ))
    }

    /// Subscription panel for the viewer. Fails if the viewer's id cannot
    /// key a subscriber.
    pub fn subscription_panel(
        &self,
        list_id: impl Into<String>,
        subscription_type: SubscriptionType,
        subscribers: Vec<Subscriber>,
    ) -> Result<SubscriptionPanel<A, N>, PanelError> {
        let store = LocalStore::from_entities(subscribers)?;
        Ok(SubscriptionPanel::new(
            self.clone(),
            list_id.into(),
            subscription_type,
            store,
        )?)
    }
}

fn features_key(company_id: &str) -> CacheKey {
    CacheKey::resource("features", company_id)
}

/// Error building a [`SubscriptionPanel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    Store(StoreError),
    Viewer(IdError),
}

impl std::fmt::Display for PanelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelError::Store(e) => write!(f, "store error: {}", e),
            PanelError::Viewer(e) => write!(f, "invalid viewer id: {}", e),
        }
    }
}

impl std::error::Error for PanelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PanelError::Store(e) => Some(e),
            PanelError::Viewer(e) => Some(e),
        }
    }
}

impl From<StoreError> for PanelError {
    fn from(err: StoreError) -> Self {
        PanelError::Store(err)
    }
}

impl From<IdError> for PanelError {
    fn from(err: IdError) -> Self {
        PanelError::Viewer(err)
    }
}
