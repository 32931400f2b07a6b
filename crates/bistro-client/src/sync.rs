//! Optimistic CRUD over a remote entity collection.
//!
//! Every mutation runs in three phases:
//!
//! ```text
//!   begin_*  ──► local list changed, rollback captured   (pending)
//!      │
//!   remote call (suspends; other edits may interleave)
//!      │
//!   settle   ──► Ok  → reconcile to server value          (fulfilled)
//!            └─► Err → restore rollback / drop optimistic (rejected)
//! ```
//!
//! The phases are public so callers can interleave them deliberately; the
//! async [`SyncedCollection::create`], [`update`](SyncedCollection::update)
//! and [`delete`](SyncedCollection::delete) helpers run all three in order.
//!
//! # Correlation keys
//!
//! Rollback snapshots are keyed by entity id (a temporary `tmp-` id for
//! creates). Only one snapshot is held per key: a second in-flight mutation
//! on the same entity overwrites it with the newer pre-mutation state, and
//! whichever mutation settles first consumes it.
//!
//! A pending delete hides its entity rather than dropping it, so the slot
//! keeps its place among its neighbours. A rejected delete un-hides the slot,
//! which restores the original position whatever order the other pending
//! mutations settle in.
//!
//! # Refresh
//!
//! [`SyncedCollection::refresh`] cancels the previous in-flight refresh and
//! bumps a generation counter, so a stale list can never land on top of a
//! newer one regardless of arrival order.

use std::collections::HashMap;
use std::sync::Arc;

use bistro_types::{EntityId, RemoteEntity, TransportError};
use parking_lot::Mutex;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::notify::{NoticeVariant, Notifier};
use crate::remote::EntityRemote;

/// Error from a synchronised entity operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The remote call failed. Local state has been rolled back.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No entity with this id in the local collection.
    #[error("{0} not found")]
    NotFound(EntityId),

    /// The server confirmed a different entity than the one we asked about.
    #[error("server answered for {got}, expected {expected}")]
    IdentityMismatch { expected: EntityId, got: EntityId },

    /// Concurrent edit from another client. Not produced yet.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Which CRUD operation a pending mutation is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncOp {
    Create,
    Update,
    Delete,
}

impl SyncOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOp::Create => "create",
            SyncOp::Update => "update",
            SyncOp::Delete => "delete",
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            SyncOp::Create => "created",
            SyncOp::Update => "updated",
            SyncOp::Delete => "deleted",
        }
    }
}

impl std::fmt::Display for SyncOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the server answered for a mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum Confirmation<E> {
    /// Canonical entity after a create or update.
    Entity(E),
    /// Id the server deleted.
    Deleted(EntityId),
}

impl<E: RemoteEntity> Confirmation<E> {
    fn echoed_id(&self) -> &EntityId {
        match self {
            Confirmation::Entity(entity) => entity.id(),
            Confirmation::Deleted(id) => id,
        }
    }
}

/// A mutation that has been applied locally and awaits the server.
#[derive(Debug)]
#[must_use = "a pending mutation must be settled or its rollback is never released"]
pub struct PendingMutation<E> {
    key: EntityId,
    op: SyncOp,
    optimistic: E,
}

impl<E> PendingMutation<E> {
    /// Correlation key (temporary id for creates).
    pub fn key(&self) -> &EntityId {
        &self.key
    }

    pub fn op(&self) -> SyncOp {
        self.op
    }

    /// The entity as applied locally (for deletes, the removed entity).
    pub fn optimistic(&self) -> &E {
        &self.optimistic
    }
}

/// Result of a [`SyncedCollection::refresh`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The list was replaced; this many entities are now held.
    Applied(usize),
    /// A newer refresh started before this one finished; its response was dropped.
    Superseded,
}

/// Pre-mutation value and visible position of one entity.
#[derive(Clone, Debug)]
struct Rollback<E> {
    entity: E,
    index: usize,
}

/// One held entity. A pending delete keeps its slot, hidden, until it settles.
#[derive(Clone, Debug)]
struct Slot<E> {
    entity: E,
    deleting: bool,
}

impl<E> Slot<E> {
    fn live(entity: E) -> Self {
        Self {
            entity,
            deleting: false,
        }
    }
}

#[derive(Debug)]
struct CollectionState<E> {
    items: Vec<Slot<E>>,
    rollbacks: HashMap<EntityId, Rollback<E>>,
    loading: bool,
    last_error: Option<SyncError>,
    generation: u64,
    refresh_token: Option<CancellationToken>,
}

impl<E: RemoteEntity> CollectionState<E> {
    /// Slot index of the visible entity `id`.
    fn position(&self, id: &EntityId) -> Option<usize> {
        self.items
            .iter()
            .position(|s| !s.deleting && s.entity.id() == id)
    }

    /// Slot index of `id` while its delete is pending.
    fn tombstone(&self, id: &EntityId) -> Option<usize> {
        self.items
            .iter()
            .position(|s| s.deleting && s.entity.id() == id)
    }

    fn visible(&self) -> impl Iterator<Item = &E> {
        self.items.iter().filter(|s| !s.deleting).map(|s| &s.entity)
    }

    fn visible_index(&self, slot: usize) -> usize {
        self.items[..slot].iter().filter(|s| !s.deleting).count()
    }

    /// Put a rollback value back: in place if `id` is still held (visible or
    /// hidden by a pending delete), otherwise at its recorded position.
    fn restore(&mut self, id: &EntityId, rollback: Rollback<E>) {
        let Rollback { entity, index } = rollback;
        match self.position(id).or_else(|| self.tombstone(id)) {
            Some(slot) => self.items[slot].entity = entity,
            None => self.insert_visible(index, entity),
        }
    }

    /// Insert `entity` so it becomes the `at`-th visible entry (clamped).
    fn insert_visible(&mut self, at: usize, entity: E) {
        let slot = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.deleting)
            .nth(at)
            .map_or(self.items.len(), |(i, _)| i);
        self.items.insert(slot, Slot::live(entity));
    }
}

/// One optimistic entity collection (events or locations) bound to its remote.
///
/// Cloning yields another handle on the same collection.
pub struct SyncedCollection<E: RemoteEntity> {
    state: Arc<Mutex<CollectionState<E>>>,
    remote: Arc<dyn EntityRemote<E>>,
    notifier: Arc<dyn Notifier>,
}

impl<E: RemoteEntity> Clone for SyncedCollection<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            remote: Arc::clone(&self.remote),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<E: RemoteEntity> SyncedCollection<E> {
    pub fn new(remote: Arc<dyn EntityRemote<E>>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CollectionState {
                items: Vec::new(),
                rollbacks: HashMap::new(),
                loading: false,
                last_error: None,
                generation: 0,
                refresh_token: None,
            })),
            remote,
            notifier,
        }
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    /// Snapshot of the current list, optimistic entries included.
    pub fn items(&self) -> Vec<E> {
        self.state.lock().visible().cloned().collect()
    }

    pub fn get(&self, id: &EntityId) -> Option<E> {
        let state = self.state.lock();
        state.position(id).map(|i| state.items[i].entity.clone())
    }

    pub fn len(&self) -> usize {
        self.state.lock().visible().count()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().visible().next().is_none()
    }

    /// A refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Most recent failure, cleared by the next successful refresh.
    pub fn last_error(&self) -> Option<SyncError> {
        self.state.lock().last_error.clone()
    }

    /// Number of rollback snapshots currently held.
    pub fn pending_rollbacks(&self) -> usize {
        self.state.lock().rollbacks.len()
    }

    pub fn has_rollback(&self, key: &EntityId) -> bool {
        self.state.lock().rollbacks.contains_key(key)
    }

    // =========================================================================
    // Phase 1: optimistic apply
    // =========================================================================

    /// Append an optimistic entity under a fresh temporary id.
    pub fn begin_create(&self, draft: &E::Draft) -> PendingMutation<E> {
        let key = EntityId::temporary();
        let optimistic = E::from_draft(key.clone(), draft);
        self.state.lock().items.push(Slot::live(optimistic.clone()));
        debug!("optimistic {} create as {}", E::RESOURCE, key);
        PendingMutation {
            key,
            op: SyncOp::Create,
            optimistic,
        }
    }

    /// Patch `id` locally, holding its previous value for rollback.
    pub fn begin_update(
        &self,
        id: &EntityId,
        patch: &E::Patch,
    ) -> Result<PendingMutation<E>, SyncError> {
        let mut state = self.state.lock();
        let index = state
            .position(id)
            .ok_or_else(|| SyncError::NotFound(id.clone()))?;

        let previous = state.items[index].entity.clone();
        let at = state.visible_index(index);
        if state
            .rollbacks
            .insert(id.clone(), Rollback { entity: previous, index: at })
            .is_some()
        {
            debug!("{} {} already in flight; rollback overwritten", E::RESOURCE, id);
        }

        let entity = &mut state.items[index].entity;
        entity.apply_patch(patch);
        debug!("optimistic {} update {}", E::RESOURCE, id);
        Ok(PendingMutation {
            key: id.clone(),
            op: SyncOp::Update,
            optimistic: entity.clone(),
        })
    }

    /// Hide `id` locally, holding the entity and its index for rollback.
    pub fn begin_delete(&self, id: &EntityId) -> Result<PendingMutation<E>, SyncError> {
        let mut state = self.state.lock();
        let slot = state
            .position(id)
            .ok_or_else(|| SyncError::NotFound(id.clone()))?;

        let index = state.visible_index(slot);
        state.items[slot].deleting = true;
        let removed = state.items[slot].entity.clone();
        state.rollbacks.insert(
            id.clone(),
            Rollback {
                entity: removed.clone(),
                index,
            },
        );
        debug!("optimistic {} delete {} (was at {})", E::RESOURCE, id, index);
        Ok(PendingMutation {
            key: id.clone(),
            op: SyncOp::Delete,
            optimistic: removed,
        })
    }

    // =========================================================================
    // Phase 2: settle
    // =========================================================================

    /// Reconcile a pending mutation with the server's answer.
    ///
    /// On success the local entry is replaced by the server value (a create
    /// swaps its temporary id for the real one). On failure the held rollback
    /// is restored, or the optimistic create is removed, and the error is
    /// returned. A confirmation for a different id than the correlation key
    /// is treated as a failure with [`SyncError::IdentityMismatch`].
    pub fn settle(
        &self,
        pending: PendingMutation<E>,
        result: Result<Confirmation<E>, SyncError>,
    ) -> Result<Confirmation<E>, SyncError> {
        let confirmation = match result {
            Ok(confirmation) => confirmation,
            Err(err) => return Err(self.reject(&pending, err)),
        };

        let expected_shape = matches!(
            (pending.op, &confirmation),
            (SyncOp::Create | SyncOp::Update, Confirmation::Entity(_))
                | (SyncOp::Delete, Confirmation::Deleted(_))
        );
        let identity_ok = pending.op == SyncOp::Create || confirmation.echoed_id() == &pending.key;
        if !expected_shape || !identity_ok {
            let err = SyncError::IdentityMismatch {
                expected: pending.key.clone(),
                got: confirmation.echoed_id().clone(),
            };
            return Err(self.reject(&pending, err));
        }

        self.fulfil(&pending, &confirmation);
        Ok(confirmation)
    }

    fn fulfil(&self, pending: &PendingMutation<E>, confirmation: &Confirmation<E>) {
        let mut state = self.state.lock();
        state.rollbacks.remove(&pending.key);

        let Confirmation::Entity(server) = confirmation else {
            if let Some(slot) = state.tombstone(&pending.key) {
                state.items.remove(slot);
            }
            debug!("{} {} delete confirmed", E::RESOURCE, pending.key);
            return;
        };
        match state.position(&pending.key) {
            Some(index) => {
                state.items[index].entity = server.clone();
                debug!(
                    "{} {} {} confirmed as {}",
                    E::RESOURCE,
                    pending.key,
                    pending.op,
                    server.id()
                );
            }
            None => warn!(
                "{} {} confirmed but no longer held locally; skipping reconcile",
                E::RESOURCE,
                pending.key
            ),
        }
    }

    /// Undo the optimistic change of `pending`. Returns `err` for propagation.
    fn reject(&self, pending: &PendingMutation<E>, err: SyncError) -> SyncError {
        let mut state = self.state.lock();
        match pending.op {
            SyncOp::Create => {
                if let Some(index) = state.position(&pending.key) {
                    state.items.remove(index);
                }
            }
            SyncOp::Update => match state.rollbacks.remove(&pending.key) {
                Some(rollback) => state.restore(&pending.key, rollback),
                None => warn!(
                    "{} {} rejected with no rollback held",
                    E::RESOURCE,
                    pending.key
                ),
            },
            SyncOp::Delete => {
                let rollback = state.rollbacks.remove(&pending.key);
                match (state.tombstone(&pending.key), rollback) {
                    (Some(slot), rollback) => {
                        let held = &mut state.items[slot];
                        held.deleting = false;
                        if let Some(Rollback { entity, .. }) = rollback {
                            held.entity = entity;
                        }
                    }
                    (None, Some(rollback)) => state.restore(&pending.key, rollback),
                    (None, None) => warn!(
                        "{} {} delete rejected but nothing is held to restore",
                        E::RESOURCE,
                        pending.key
                    ),
                }
            }
        }
        warn!(
            "{} {} {} rejected, rolled back: {}",
            E::RESOURCE,
            pending.op,
            pending.key,
            err
        );
        state.last_error = Some(err.clone());
        err
    }

    // =========================================================================
    // One-shot helpers: begin → remote → settle → notify
    // =========================================================================

    pub async fn create(&self, draft: E::Draft) -> Result<E, SyncError> {
        let pending = self.begin_create(&draft);
        let key = pending.key.clone();
        let result = self
            .remote
            .create(&draft)
            .await
            .map(Confirmation::Entity)
            .map_err(SyncError::from);
        let settled = self.settle(pending, result).and_then(|c| match c {
            Confirmation::Entity(entity) => Ok(entity),
            Confirmation::Deleted(got) => Err(SyncError::IdentityMismatch { expected: key, got }),
        });
        self.report(SyncOp::Create, settled.as_ref().err());
        settled
    }

    pub async fn update(&self, id: &EntityId, patch: E::Patch) -> Result<E, SyncError> {
        let pending = self.begin_update(id, &patch)?;
        let result = self
            .remote
            .update(id, &patch)
            .await
            .map(Confirmation::Entity)
            .map_err(SyncError::from);
        let settled = self.settle(pending, result).and_then(|c| match c {
            Confirmation::Entity(entity) => Ok(entity),
            Confirmation::Deleted(got) => Err(SyncError::IdentityMismatch {
                expected: id.clone(),
                got,
            }),
        });
        self.report(SyncOp::Update, settled.as_ref().err());
        settled
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), SyncError> {
        let pending = self.begin_delete(id)?;
        let result = self
            .remote
            .delete(id)
            .await
            .map(Confirmation::Deleted)
            .map_err(SyncError::from);
        let settled = self.settle(pending, result).map(|_| ());
        self.report(SyncOp::Delete, settled.as_ref().err());
        settled
    }

    fn report(&self, op: SyncOp, err: Option<&SyncError>) {
        let resource = capitalized(E::RESOURCE);
        match err {
            None => self
                .notifier
                .notify(NoticeVariant::Success, &format!("{resource} {}", op.past_tense())),
            Some(err) => self.notifier.notify(
                NoticeVariant::Error,
                &format!("Failed to {op} {}: {err}", E::RESOURCE),
            ),
        }
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Replace the list with the server's, superseding any refresh in flight.
    pub async fn refresh(&self) -> Result<FetchOutcome, SyncError> {
        let (token, generation) = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.loading = true;
            let token = CancellationToken::new();
            if let Some(previous) = state.refresh_token.replace(token.clone()) {
                previous.cancel();
            }
            (token, state.generation)
        };

        let listed = tokio::select! {
            _ = token.cancelled() => {
                debug!("{} refresh {} cancelled", E::RESOURCE, generation);
                return Ok(FetchOutcome::Superseded);
            }
            listed = self.remote.list() => listed,
        };

        let mut state = self.state.lock();
        if state.generation != generation {
            debug!("{} refresh {} arrived stale; dropped", E::RESOURCE, generation);
            return Ok(FetchOutcome::Superseded);
        }
        state.loading = false;
        state.refresh_token = None;

        match listed {
            Ok(items) => {
                let count = items.len();
                state.items = items.into_iter().map(Slot::live).collect();
                state.last_error = None;
                info!("{} list refreshed: {} items", E::RESOURCE, count);
                Ok(FetchOutcome::Applied(count))
            }
            Err(e) => {
                let err = SyncError::from(e);
                state.last_error = Some(err.clone());
                drop(state);
                warn!("{} refresh failed: {}", E::RESOURCE, err);
                self.notifier.notify(
                    NoticeVariant::Error,
                    &format!("Failed to load {}s: {err}", E::RESOURCE),
                );
                Err(err)
            }
        }
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEntityRemote;
    use crate::notify::TracingNotifier;
    use bistro_types::{Location, LocationDraft, LocationPatch};

    fn location(id: &str, name: &str) -> Location {
        Location::from_draft(
            EntityId::new(id),
            &LocationDraft {
                name: name.into(),
                ..Default::default()
            },
        )
    }

    fn collection(items: Vec<Location>) -> SyncedCollection<Location> {
        let remote = Arc::new(MemoryEntityRemote::with_items(items.clone()));
        let coll = SyncedCollection::new(remote, Arc::new(TracingNotifier));
        coll.state.lock().items = items.into_iter().map(Slot::live).collect();
        coll
    }

    fn rename(name: &str) -> LocationPatch {
        LocationPatch {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_begin_update_unknown_id_touches_nothing() {
        let coll = collection(vec![location("a", "X")]);
        let err = coll.begin_update(&EntityId::new("zz"), &rename("Y")).unwrap_err();
        assert_eq!(err, SyncError::NotFound(EntityId::new("zz")));
        assert_eq!(coll.items()[0].name, "X");
        assert_eq!(coll.pending_rollbacks(), 0);
    }

    #[test]
    fn test_update_reject_restores_previous() {
        let coll = collection(vec![location("a", "X")]);
        let pending = coll.begin_update(&EntityId::new("a"), &rename("Y")).unwrap();
        assert_eq!(coll.items()[0].name, "Y");

        let err = coll
            .settle(pending, Err(TransportError::new("503").into()))
            .unwrap_err();
        assert!(matches!(err, SyncError::Transport(_)));
        assert_eq!(coll.items()[0].name, "X");
        assert_eq!(coll.pending_rollbacks(), 0);
        assert_eq!(coll.last_error(), Some(err));
    }

    #[test]
    fn test_create_fulfil_swaps_temporary_id() {
        let coll = collection(vec![]);
        let pending = coll.begin_create(&LocationDraft {
            name: "Harbour".into(),
            ..Default::default()
        });
        assert!(pending.key().is_temporary());
        assert!(coll.items()[0].id.is_temporary());

        let server = location("loc_1", "Harbour");
        coll.settle(pending, Ok(Confirmation::Entity(server.clone())))
            .unwrap();
        assert_eq!(coll.items(), vec![server]);
    }

    #[test]
    fn test_delete_reject_reinserts_at_original_index() {
        let coll = collection(vec![
            location("a", "A"),
            location("b", "B"),
            location("c", "C"),
        ]);
        let pending = coll.begin_delete(&EntityId::new("b")).unwrap();
        assert_eq!(coll.len(), 2);

        coll.settle(pending, Err(TransportError::new("timeout").into()))
            .unwrap_err();
        let names: Vec<_> = coll.items().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    fn names(coll: &SyncedCollection<Location>) -> Vec<String> {
        coll.items().into_iter().map(|l| l.name).collect()
    }

    #[test]
    fn test_overlapping_delete_rejections_keep_order() {
        let coll = collection(vec![
            location("a", "A"),
            location("b", "B"),
            location("c", "C"),
        ]);
        let del_b = coll.begin_delete(&EntityId::new("b")).unwrap();
        let del_a = coll.begin_delete(&EntityId::new("a")).unwrap();
        assert_eq!(names(&coll), vec!["C"]);

        coll.settle(del_b, Err(TransportError::new("503").into()))
            .unwrap_err();
        assert_eq!(names(&coll), vec!["B", "C"]);
        coll.settle(del_a, Err(TransportError::new("503").into()))
            .unwrap_err();
        assert_eq!(names(&coll), vec!["A", "B", "C"]);
        assert_eq!(coll.pending_rollbacks(), 0);
    }

    #[test]
    fn test_rejected_delete_beside_confirmed_one() {
        let coll = collection(vec![
            location("a", "A"),
            location("b", "B"),
            location("c", "C"),
        ]);
        let del_c = coll.begin_delete(&EntityId::new("c")).unwrap();
        let del_b = coll.begin_delete(&EntityId::new("b")).unwrap();

        coll.settle(del_b, Ok(Confirmation::Deleted(EntityId::new("b"))))
            .unwrap();
        coll.settle(del_c, Err(TransportError::new("503").into()))
            .unwrap_err();
        assert_eq!(names(&coll), vec!["A", "C"]);
        assert_eq!(coll.state.lock().items.len(), 2);
    }

    #[test]
    fn test_delete_rejected_after_refresh_reinserts_at_index() {
        let coll = collection(vec![location("a", "A"), location("b", "B")]);
        let pending = coll.begin_delete(&EntityId::new("a")).unwrap();
        // A refresh that lands mid-flight drops the hidden slot.
        coll.state.lock().items = vec![Slot::live(location("b", "B"))];

        coll.settle(pending, Err(TransportError::new("503").into()))
            .unwrap_err();
        assert_eq!(names(&coll), vec!["A", "B"]);
    }

    #[test]
    fn test_delete_echo_mismatch_rolls_back() {
        let coll = collection(vec![location("a", "A")]);
        let pending = coll.begin_delete(&EntityId::new("a")).unwrap();

        let err = coll
            .settle(pending, Ok(Confirmation::Deleted(EntityId::new("other"))))
            .unwrap_err();
        assert_eq!(
            err,
            SyncError::IdentityMismatch {
                expected: EntityId::new("a"),
                got: EntityId::new("other"),
            }
        );
        assert_eq!(coll.len(), 1);
    }

    #[test]
    fn test_second_update_overwrites_rollback() {
        let coll = collection(vec![location("a", "X")]);
        let id = EntityId::new("a");

        let first = coll.begin_update(&id, &rename("Y")).unwrap();
        let second = coll.begin_update(&id, &rename("Z")).unwrap();
        assert_eq!(coll.pending_rollbacks(), 1);

        // The held snapshot is the state before the second update.
        coll.settle(second, Err(TransportError::new("boom").into()))
            .unwrap_err();
        assert_eq!(coll.items()[0].name, "Y");

        // The first settles with nothing left to roll back to.
        coll.settle(first, Err(TransportError::new("boom").into()))
            .unwrap_err();
        assert_eq!(coll.items()[0].name, "Y");
        assert_eq!(coll.pending_rollbacks(), 0);
    }

    #[test]
    fn test_create_fulfil_after_entity_gone_is_skipped() {
        let coll = collection(vec![]);
        let pending = coll.begin_create(&LocationDraft::default());
        coll.state.lock().items.clear();

        let server = location("loc_9", "");
        let confirmed = coll
            .settle(pending, Ok(Confirmation::Entity(server)))
            .unwrap();
        assert!(matches!(confirmed, Confirmation::Entity(_)));
        assert!(coll.is_empty());
    }

    #[test]
    fn test_capitalized() {
        assert_eq!(capitalized("event"), "Event");
        assert_eq!(capitalized(""), "");
    }
}
