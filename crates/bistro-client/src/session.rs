//! Edit session: the façade a UI drives.
//!
//! [`EditSession`] bundles a [`Canvas`] with the website remote, the dirty
//! flag, and save/load lifecycle. Consumers call one method per user action
//! and read state back through snapshot accessors; none of the history or
//! resolver plumbing leaks out.
//!
//! The session is a cheap clonable handle. All state sits behind one
//! `parking_lot::Mutex` that is never held across an `.await`, so local edits
//! keep flowing while a save or load is suspended.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bistro_canvas::{
    BlockId, BlockKind, BlockPatch, Canvas, CanvasCommand, CanvasError, ContentBlock, DeviceTier,
    DropEvent, Effect,
};
use bistro_types::{RestaurantId, TransportError, now_millis};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::constants::MIN_AUTOSAVE_INTERVAL;
use crate::notify::{NoticeVariant, Notifier};
use crate::remote::WebsiteRemote;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result of [`EditSession::save`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Stored. `still_dirty` is set when edits landed while the save was in flight.
    Saved { at: u64, still_dirty: bool },
    /// Another save was running; nothing was sent.
    AlreadyInFlight,
}

/// Result of [`EditSession::load`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    /// A newer load started first; this response was dropped.
    Superseded,
}

/// Synchronous session state.
#[derive(Debug)]
pub struct SessionState {
    canvas: Canvas,
    unsaved_changes: bool,
    /// Unix ms of the last successful save.
    last_saved: Option<u64>,
    save_in_flight: bool,
    /// Bumped on every document edit; lets a save tell if it is still current.
    revision: u64,
}

impl SessionState {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            unsaved_changes: false,
            last_saved: None,
            save_in_flight: false,
            revision: 0,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    pub fn last_saved(&self) -> Option<u64> {
        self.last_saved
    }

    pub fn is_saving(&self) -> bool {
        self.save_in_flight
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply a command and update the dirty flag from its effect.
    pub fn apply(&mut self, command: CanvasCommand) -> Result<Effect, CanvasError> {
        let is_load = matches!(command, CanvasCommand::Load { .. });
        let effect = self.canvas.dispatch(command)?;
        if effect.changed {
            self.revision += 1;
            self.unsaved_changes = !is_load;
        }
        Ok(effect)
    }
}

/// Clears the in-flight flag even if the save future is dropped mid-await.
struct SaveGuard<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().save_in_flight = false;
    }
}

/// Editing session for one restaurant website.
#[derive(Clone)]
pub struct EditSession {
    restaurant: RestaurantId,
    state: Arc<Mutex<SessionState>>,
    remote: Arc<dyn WebsiteRemote>,
    notifier: Arc<dyn Notifier>,
    load_token: Arc<Mutex<Option<CancellationToken>>>,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("restaurant", &self.restaurant)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl EditSession {
    pub fn new(
        restaurant: RestaurantId,
        remote: Arc<dyn WebsiteRemote>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_canvas(restaurant, remote, notifier, Canvas::default())
    }

    /// Session whose history limit and drop debounce come from `config`.
    pub fn from_config(
        restaurant: RestaurantId,
        remote: Arc<dyn WebsiteRemote>,
        notifier: Arc<dyn Notifier>,
        config: &EditorConfig,
    ) -> Self {
        let canvas = Canvas::new(config.history_limit, config.drop_debounce());
        Self::with_canvas(restaurant, remote, notifier, canvas)
    }

    fn with_canvas(
        restaurant: RestaurantId,
        remote: Arc<dyn WebsiteRemote>,
        notifier: Arc<dyn Notifier>,
        canvas: Canvas,
    ) -> Self {
        Self {
            restaurant,
            state: Arc::new(Mutex::new(SessionState::new(canvas))),
            remote,
            notifier,
            load_token: Arc::new(Mutex::new(None)),
        }
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    pub fn restaurant(&self) -> RestaurantId {
        self.restaurant
    }

    pub fn blocks(&self) -> Vec<ContentBlock> {
        self.state.lock().canvas.blocks().to_vec()
    }

    pub fn selected_block(&self) -> Option<ContentBlock> {
        self.state.lock().canvas.selected_block().cloned()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.state.lock().unsaved_changes
    }

    pub fn last_saved(&self) -> Option<u64> {
        self.state.lock().last_saved
    }

    pub fn is_saving(&self) -> bool {
        self.state.lock().save_in_flight
    }

    pub fn can_undo(&self) -> bool {
        self.state.lock().canvas.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.lock().canvas.history().can_redo()
    }

    /// Run `f` against the locked state. Keep it short; edits block meanwhile.
    pub fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.state.lock())
    }

    // =========================================================================
    // Edits
    // =========================================================================

    pub fn dispatch(&self, command: CanvasCommand) -> Result<Effect, SessionError> {
        Ok(self.state.lock().apply(command)?)
    }

    pub fn add_block(&self, kind: BlockKind, position: i64) -> Result<BlockId, SessionError> {
        let effect = self.dispatch(CanvasCommand::AddBlock { kind, position })?;
        Ok(effect.added.unwrap_or_else(BlockId::nil))
    }

    pub fn update_block(&self, id: BlockId, patch: BlockPatch) -> Result<bool, SessionError> {
        self.changed(CanvasCommand::UpdateBlock { id, patch })
    }

    pub fn set_style(
        &self,
        id: BlockId,
        tier: DeviceTier,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<bool, SessionError> {
        self.changed(CanvasCommand::SetStyle {
            id,
            tier,
            key: key.into(),
            value,
        })
    }

    pub fn remove_style(
        &self,
        id: BlockId,
        tier: DeviceTier,
        key: impl Into<String>,
    ) -> Result<bool, SessionError> {
        self.changed(CanvasCommand::RemoveStyle {
            id,
            tier,
            key: key.into(),
        })
    }

    pub fn remove_block(&self, id: BlockId) -> Result<bool, SessionError> {
        self.changed(CanvasCommand::RemoveBlock { id })
    }

    pub fn reorder_blocks(&self, source: usize, target: usize) -> Result<bool, SessionError> {
        self.changed(CanvasCommand::ReorderBlocks { source, target })
    }

    /// Resolve and apply a drop gesture.
    pub fn drop_block(&self, event: &DropEvent) -> Result<bool, SessionError> {
        self.drop_block_at(event, Instant::now())
    }

    /// [`drop_block`](Self::drop_block) with an explicit clock, for replay and tests.
    pub fn drop_block_at(&self, event: &DropEvent, now: Instant) -> Result<bool, SessionError> {
        let mut state = self.state.lock();
        let effect = state.canvas.drop_block(event, now)?;
        if effect.changed {
            state.revision += 1;
            state.unsaved_changes = true;
        }
        Ok(effect.changed)
    }

    /// Selection is presentational: it never dirties the session.
    pub fn select_block(&self, id: Option<BlockId>) {
        // SelectBlock cannot fail.
        let _ = self.dispatch(CanvasCommand::SelectBlock { id });
    }

    /// Step back one edit. `false` (and no dirtying) when there is nothing to undo.
    pub fn undo(&self) -> bool {
        self.changed(CanvasCommand::Undo).unwrap_or(false)
    }

    pub fn redo(&self) -> bool {
        self.changed(CanvasCommand::Redo).unwrap_or(false)
    }

    fn changed(&self, command: CanvasCommand) -> Result<bool, SessionError> {
        Ok(self.dispatch(command)?.changed)
    }

    // =========================================================================
    // Remote lifecycle
    // =========================================================================

    /// Replace the document with the stored one.
    ///
    /// Cancels any load still in flight. Resets history, selection, and the
    /// dirty flag.
    pub async fn load(&self) -> Result<LoadOutcome, SessionError> {
        let token = CancellationToken::new();
        if let Some(previous) = self.load_token.lock().replace(token.clone()) {
            previous.cancel();
        }

        let fetched = tokio::select! {
            _ = token.cancelled() => {
                debug!("load of {} superseded", self.restaurant);
                return Ok(LoadOutcome::Superseded);
            }
            fetched = self.remote.fetch(self.restaurant) => fetched,
        };
        if token.is_cancelled() {
            return Ok(LoadOutcome::Superseded);
        }

        match fetched {
            Ok(blocks) => {
                let count = blocks.len();
                self.state.lock().apply(CanvasCommand::Load { blocks })?;
                info!("loaded website {} ({} blocks)", self.restaurant, count);
                Ok(LoadOutcome::Loaded(count))
            }
            Err(e) => {
                warn!("load of {} failed: {}", self.restaurant, e);
                self.notifier
                    .notify(NoticeVariant::Error, &format!("Failed to load website: {e}"));
                Err(e.into())
            }
        }
    }

    /// Send the whole block list to the remote.
    ///
    /// Never rolls back local edits. On failure the session stays dirty and the
    /// error is returned (and announced).
    pub async fn save(&self) -> Result<SaveOutcome, SessionError> {
        let (blocks, revision) = {
            let mut state = self.state.lock();
            if state.save_in_flight {
                debug!("save of {} already in flight", self.restaurant);
                return Ok(SaveOutcome::AlreadyInFlight);
            }
            state.save_in_flight = true;
            (state.canvas.blocks().to_vec(), state.revision)
        };
        let guard = SaveGuard { state: &self.state };

        let result = self.remote.save(self.restaurant, &blocks).await;
        drop(guard);

        match result {
            Ok(()) => {
                let at = now_millis();
                let still_dirty = {
                    let mut state = self.state.lock();
                    state.last_saved = Some(at);
                    if state.revision == revision {
                        state.unsaved_changes = false;
                    }
                    state.unsaved_changes
                };
                info!(
                    "saved website {} ({} blocks{})",
                    self.restaurant,
                    blocks.len(),
                    if still_dirty { ", edited during save" } else { "" }
                );
                self.notifier.notify(NoticeVariant::Success, "Website saved");
                Ok(SaveOutcome::Saved { at, still_dirty })
            }
            Err(e) => {
                warn!("save of {} failed: {}", self.restaurant, e);
                self.notifier
                    .notify(NoticeVariant::Error, &format!("Failed to save website: {e}"));
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Autosave
    // =========================================================================

    /// Save every `interval` while the session is dirty.
    ///
    /// The first check happens one interval after spawning. Saves run inline
    /// on the task, so autosave never overlaps itself; a manual save already
    /// running makes the tick a no-op. Intervals shorter than
    /// [`MIN_AUTOSAVE_INTERVAL`] are raised to it.
    pub fn spawn_autosave(&self, interval: Duration) -> AutosaveHandle {
        let interval = if interval < MIN_AUTOSAVE_INTERVAL {
            warn!(
                "autosave interval {:?} too short; using {:?}",
                interval, MIN_AUTOSAVE_INTERVAL
            );
            MIN_AUTOSAVE_INTERVAL
        } else {
            interval
        };
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let session = self.clone();

        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if !session.has_unsaved_changes() {
                            continue;
                        }
                        if let Err(e) = session.save().await {
                            warn!("autosave of {} failed: {}", session.restaurant, e);
                        }
                    }
                }
            }
            debug!("autosave for {} stopped", session.restaurant);
        });

        AutosaveHandle {
            token,
            task: Some(task),
        }
    }

    /// Start autosave if `config` enables it.
    pub fn start_autosave(&self, config: &EditorConfig) -> Option<AutosaveHandle> {
        config
            .autosave_enabled
            .then(|| self.spawn_autosave(config.autosave_interval()))
    }
}

/// Running autosave task. Dropping the handle stops it.
#[derive(Debug)]
pub struct AutosaveHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AutosaveHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait for the task to finish (including a save in progress).
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!("autosave task ended abnormally: {e}");
        }
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryWebsiteRemote;
    use crate::notify::TracingNotifier;

    fn session() -> (EditSession, Arc<MemoryWebsiteRemote>) {
        let remote = Arc::new(MemoryWebsiteRemote::new());
        let session = EditSession::new(RestaurantId::new(), remote.clone(), Arc::new(TracingNotifier));
        (session, remote)
    }

    #[test]
    fn test_edits_dirty_only_when_they_change_something() {
        let (session, _) = session();
        assert!(!session.has_unsaved_changes());

        assert!(!session.undo());
        assert!(!session.has_unsaved_changes());

        assert!(!session.update_block(BlockId::new(), BlockPatch::new().visible(false)).unwrap());
        assert!(!session.has_unsaved_changes());

        session.add_block(BlockKind::Header, 0).unwrap();
        assert!(session.has_unsaved_changes());
    }

    #[test]
    fn test_selection_does_not_dirty() {
        let (session, _) = session();
        let id = session.add_block(BlockKind::Menu, 0).unwrap();
        session.with_state(|s| assert_eq!(s.revision(), 1));

        session.select_block(Some(id));
        assert_eq!(session.selected_block().map(|b| b.id), Some(id));
        session.with_state(|s| assert_eq!(s.revision(), 1));
    }

    #[test]
    fn test_canvas_errors_propagate() {
        let (session, _) = session();
        let err = session.reorder_blocks(0, 1).unwrap_err();
        assert_eq!(
            err,
            SessionError::Canvas(CanvasError::IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[tokio::test]
    async fn test_save_clears_dirty_and_stamps() {
        let (session, remote) = session();
        session.add_block(BlockKind::Hero, 0).unwrap();

        let outcome = session.save().await.unwrap();
        assert!(matches!(outcome, SaveOutcome::Saved { still_dirty: false, .. }));
        assert!(!session.has_unsaved_changes());
        assert!(session.last_saved().is_some());
        assert_eq!(remote.stored(session.restaurant()).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_resets_state() {
        let (session, remote) = session();
        remote.insert(
            session.restaurant(),
            vec![ContentBlock::new(BlockKind::Footer)],
        );
        session.add_block(BlockKind::Header, 0).unwrap();

        assert_eq!(session.load().await.unwrap(), LoadOutcome::Loaded(1));
        assert!(!session.has_unsaved_changes());
        assert!(!session.can_undo());
        assert_eq!(session.blocks()[0].kind, BlockKind::Footer);
    }
}
