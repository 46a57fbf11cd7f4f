use std::future::Future;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{Change, Confirmation, MutationOutcome, Notice, Notifier, OptimisticMutation, RemoteError};
use crate::entity::{merge_fields, EntityId, StoreEntity, TempIdAllocator};
use crate::invalidation::{CacheKey, InvalidationSignal};
use crate::store::{LocalStore, StoreError};

/// How to undo an applied change. Each mutation keeps its own copy of the
/// previous value; concurrent mutations on one id are not serialized.
enum Rollback<E> {
    /// Drop the optimistically created entity.
    Discard(EntityId),
    /// Put back the value the entity had before the edit.
    Restore(E),
    /// Reinsert a deleted entity at its former position.
    Reinsert { index: usize, previous: E },
}

enum Applied<E> {
    Applied { id: EntityId, rollback: Rollback<E> },
    Stale(EntityId),
}

/// Runs optimistic mutations against local stores.
///
/// Each call to [`run`](Self::run) applies the local change synchronously,
/// invokes the remote call exactly once, and then either confirms the
/// change (invalidating the mutation's cache keys) or restores the
/// pre-mutation state and raises a [`Notice`]. Remote failures never
/// escape `run`; only store invariant violations are returned as errors.
pub struct OptimisticExecutor<N> {
    notifier: N,
    signal: InvalidationSignal,
    temp_ids: TempIdAllocator,
    notify_failures: bool,
}

impl<N> OptimisticExecutor<N> {
    /// Create an executor reporting failures to `notifier` and
    /// invalidating keys on `signal`.
    pub fn new(notifier: N, signal: InvalidationSignal) -> Self {
        Self {
            notifier,
            signal,
            temp_ids: TempIdAllocator::new(),
            notify_failures: true,
        }
    }

    /// Enable or disable user-visible notices for rolled-back mutations.
    pub fn with_failure_notices(mut self, enabled: bool) -> Self {
        self.notify_failures = enabled;
        self
    }

    /// Allocate a temporary id for a draft entity.
    pub fn allocate_temp_id(&self) -> EntityId {
        self.temp_ids.next_id()
    }

    pub fn signal(&self) -> &InvalidationSignal {
        &self.signal
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

impl<N: Notifier> OptimisticExecutor<N> {
    /// Apply `mutation` to `store`, call `remote`, and reconcile.
    ///
    /// The optimistic state is visible before `remote` is invoked.
    pub async fn run<E, F, Fut>(
        &self,
        store: &LocalStore<E>,
        mutation: OptimisticMutation<E>,
        remote: F,
    ) -> Result<MutationOutcome, StoreError>
    where
        E: StoreEntity,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Confirmation, RemoteError>>,
    {
        let OptimisticMutation {
            kind,
            change,
            invalidates,
        } = mutation;

        let (id, rollback) = match apply(store, change)? {
            Applied::Applied { id, rollback } => (id, rollback),
            Applied::Stale(id) => {
                debug!(kind = %kind, entity = E::KIND, id = %id, "target gone, skipping mutation");
                return Ok(MutationOutcome::Stale { id });
            }
        };
        debug!(kind = %kind, entity = E::KIND, id = %id, "optimistic change applied");

        let result = remote().await;

        if !store.is_attached() {
            let confirmed = match &result {
                Ok(_) => {
                    self.invalidate_all(&invalidates);
                    true
                }
                Err(error) => {
                    warn!(kind = %kind, error = %error, "mutation failed after view detached");
                    self.raise(kind);
                    false
                }
            };
            debug!(kind = %kind, id = %id, "store detached, skipping reconciliation");
            return Ok(MutationOutcome::Detached { confirmed });
        }

        match result {
            Ok(confirmation) => {
                let confirmed = confirm(store, &rollback, id, confirmation);
                // The backend accepted the change even when reconciling failed.
                self.invalidate_all(&invalidates);
                let confirmed_id = confirmed?;
                debug!(kind = %kind, entity = E::KIND, id = %confirmed_id, "mutation confirmed");
                Ok(MutationOutcome::Confirmed { id: confirmed_id })
            }
            Err(error) => {
                warn!(
                    kind = %kind,
                    entity = E::KIND,
                    id = %id,
                    error = %error,
                    "mutation rejected, rolling back"
                );
                roll_back(store, rollback)?;
                self.raise(kind);
                Ok(MutationOutcome::RolledBack { error })
            }
        }
    }

    fn invalidate_all(&self, keys: &[CacheKey]) {
        for key in keys {
            self.signal.invalidate(key);
        }
    }

    fn raise(&self, kind: super::MutationKind) {
        if self.notify_failures {
            self.notifier.notify(&Notice::failure(kind));
        }
    }
}

fn apply<E: StoreEntity>(store: &LocalStore<E>, change: Change<E>) -> Result<Applied<E>, StoreError> {
    store.transition(|list| match change {
        Change::Create(draft) => {
            let id = draft.id().clone();
            let next = list.insert(draft)?;
            Ok((
                next,
                Applied::Applied {
                    id: id.clone(),
                    rollback: Rollback::Discard(id),
                },
            ))
        }
        Change::Update { id, update } => {
            let Some(previous) = list.find(&id).cloned() else {
                return Ok((list.clone(), Applied::Stale(id)));
            };
            let mut updated = update(&previous);
            updated.set_id(id.clone());
            let next = list.replace(&id, |_| updated);
            Ok((
                next,
                Applied::Applied {
                    id,
                    rollback: Rollback::Restore(previous),
                },
            ))
        }
        Change::Remove(id) => {
            let Some(index) = list.position(&id) else {
                return Ok((list.clone(), Applied::Stale(id)));
            };
            let previous = list.as_slice()[index].clone();
            Ok((
                list.remove(&id),
                Applied::Applied {
                    id,
                    rollback: Rollback::Reinsert { index, previous },
                },
            ))
        }
    })
}

fn confirm<E: StoreEntity>(
    store: &LocalStore<E>,
    rollback: &Rollback<E>,
    id: EntityId,
    confirmation: Confirmation,
) -> Result<EntityId, StoreError> {
    let Confirmation { id: remote_id, fields } = confirmation;

    match rollback {
        Rollback::Discard(_) => {
            let confirmed_id = match remote_id {
                Some(remote_id) => remote_id,
                None if id.is_temporary() => {
                    // A pending entity must never outlive its mutation.
                    store.transition(|list| Ok((list.remove(&id), ())))?;
                    return Err(StoreError::MissingRemoteId(id));
                }
                None => id.clone(),
            };
            store.transition(|list| {
                if !list.contains(&id) {
                    return Ok((list.clone(), ()));
                }
                // A refetch may already have delivered the confirmed entity.
                if confirmed_id != id && list.contains(&confirmed_id) {
                    return Ok((list.remove(&id), ()));
                }
                let next = list.replace(&id, |entity| reconcile(entity, &confirmed_id, &fields));
                Ok((next, ()))
            })?;
            Ok(confirmed_id)
        }
        Rollback::Restore(_) => {
            if !fields.is_empty() {
                store.transition(|list| {
                    let next = list.replace(&id, |entity| reconcile(entity, &id, &fields));
                    Ok((next, ()))
                })?;
            }
            Ok(id)
        }
        Rollback::Reinsert { .. } => Ok(id),
    }
}

fn reconcile<E: StoreEntity>(entity: &E, id: &EntityId, fields: &Map<String, Value>) -> E {
    let mut confirmed = match merge_fields(entity, fields) {
        Ok(merged) => merged,
        Err(err) => {
            warn!(entity = E::KIND, id = %id, error = %err, "ignoring malformed normalized fields");
            entity.clone()
        }
    };
    confirmed.set_id(id.clone());
    confirmed
}

fn roll_back<E: StoreEntity>(store: &LocalStore<E>, rollback: Rollback<E>) -> Result<(), StoreError> {
    store.transition(|list| {
        let next = match rollback {
            Rollback::Discard(id) => list.remove(&id),
            Rollback::Restore(previous) => {
                let id = previous.id().clone();
                list.replace(&id, |_| previous)
            }
            Rollback::Reinsert { index, previous } => {
                if list.contains(previous.id()) {
                    list.clone()
                } else {
                    list.insert_at(index, previous)?
                }
            }
        };
        Ok((next, ()))
    })
}
