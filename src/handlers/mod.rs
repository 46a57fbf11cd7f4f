//! View-facing handlers.
//!
//! Each handler owns the [`LocalStore`](crate::LocalStore) of one view and
//! exposes a `handle_*` method per mutation. Every method resolves once the
//! attempt has been confirmed or rolled back; remote failures surface only
//! as [`MutationOutcome::RolledBack`](crate::MutationOutcome) plus a notice.

mod comments;
mod reactions;
mod subscriptions;

pub use comments::CommentThread;
pub use reactions::ReactionList;
pub use subscriptions::SubscriptionPanel;

use std::fmt;
use std::future::Future;

use tracing::debug;

use crate::entity::StoreEntity;
use crate::invalidation::{CacheKey, InvalidationSignal};
use crate::mutation::RemoteError;
use crate::store::{EntityList, LocalStore, StoreError};

/// Error from a handler's `refresh`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    Remote(RemoteError),
    Store(StoreError),
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshError::Remote(e) => write!(f, "refresh failed: {}", e),
            RefreshError::Store(e) => write!(f, "refresh failed: {}", e),
        }
    }
}

impl std::error::Error for RefreshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RefreshError::Remote(e) => Some(e),
            RefreshError::Store(e) => Some(e),
        }
    }
}

impl From<RemoteError> for RefreshError {
    fn from(err: RemoteError) -> Self {
        RefreshError::Remote(err)
    }
}

impl From<StoreError> for RefreshError {
    fn from(err: StoreError) -> Self {
        RefreshError::Store(err)
    }
}

/// Replace a view's collection with freshly loaded entities and clear the
/// staleness of `key`, unless it was invalidated again while loading. On
/// failure the store and the flag are left as they were.
async fn refresh_store<E, F, Fut>(
    store: &LocalStore<E>,
    signal: &InvalidationSignal,
    key: &CacheKey,
    loader: F,
) -> Result<(), RefreshError>
where
    E: StoreEntity,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<E>, RemoteError>>,
{
    let generation = signal.generation(key);
    let entities = loader().await?;
    store.reset(EntityList::from_entities(entities)?)?;
    if !signal.mark_fresh_since(key, generation) {
        debug!(key = %key, "invalidated during refresh, key stays stale");
    }
    Ok(())
}
