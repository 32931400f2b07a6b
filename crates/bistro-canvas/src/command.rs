//! Canvas commands and the reducer that applies them.
//!
//! [`CanvasCommand`] is the closed set of edits a UI can request. A single
//! match in [`Canvas::dispatch`] routes each one to the document, records
//! history for real forward edits, and keeps the selection valid.
//!
//! [`reduce`] is the pure form: it leaves the input untouched and returns the
//! next state, which is handy for tests and for previewing an edit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bistro_types::{BlockId, BlockKind, BlockPatch, ContentBlock, DeviceTier};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::history::{DEFAULT_HISTORY_LIMIT, History, MutationKind};
use crate::reorder::{DEFAULT_DROP_DEBOUNCE, DropEvent, ReorderResolver, Resolution};
use crate::{Document, Result};

/// An edit request against the canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CanvasCommand {
    AddBlock {
        kind: BlockKind,
        position: i64,
    },
    UpdateBlock {
        id: BlockId,
        patch: BlockPatch,
    },
    SetStyle {
        id: BlockId,
        tier: DeviceTier,
        key: String,
        value: serde_json::Value,
    },
    RemoveStyle {
        id: BlockId,
        tier: DeviceTier,
        key: String,
    },
    RemoveBlock {
        id: BlockId,
    },
    ReorderBlocks {
        source: usize,
        target: usize,
    },
    /// Presentational only; never recorded.
    SelectBlock {
        id: Option<BlockId>,
    },
    Undo,
    Redo,
    /// Replace the document wholesale and start a fresh history.
    Load {
        blocks: Vec<ContentBlock>,
    },
}

impl CanvasCommand {
    /// Whether this command can change the block collection.
    pub fn is_document_edit(&self) -> bool {
        !matches!(self, CanvasCommand::SelectBlock { .. })
    }
}

/// What a dispatched command did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Effect {
    /// The block collection changed.
    pub changed: bool,
    /// A history entry was pushed for this forward edit.
    pub recorded: Option<MutationKind>,
    /// Id of a block created by this command.
    pub added: Option<BlockId>,
}

impl Effect {
    fn unchanged() -> Self {
        Self::default()
    }

    fn recorded(kind: MutationKind) -> Self {
        Self {
            changed: true,
            recorded: Some(kind),
            added: None,
        }
    }
}

/// Editable document plus its history, selection, and drop resolver.
#[derive(Clone, Debug)]
pub struct Canvas {
    document: Document,
    history: History,
    selected: Option<BlockId>,
    resolver: ReorderResolver,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT, DEFAULT_DROP_DEBOUNCE)
    }
}

impl Canvas {
    pub fn new(history_limit: usize, drop_window: Duration) -> Self {
        Self {
            document: Document::new(),
            history: History::new(history_limit),
            selected: None,
            resolver: ReorderResolver::new(drop_window),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        self.document.blocks()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selected(&self) -> Option<BlockId> {
        self.selected
    }

    pub fn selected_block(&self) -> Option<&ContentBlock> {
        self.selected.and_then(|id| self.document.get(&id))
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Apply one command.
    ///
    /// Errors leave the canvas untouched. A command that matches nothing (an
    /// unknown id, a no-op patch, undo with an empty stack) returns an
    /// unchanged [`Effect`] and records no history.
    pub fn dispatch(&mut self, command: CanvasCommand) -> Result<Effect> {
        match command {
            CanvasCommand::AddBlock { kind, position } => {
                self.document.check_position(position)?;
                let before = self.snapshot();
                let id = self.document.add_block(kind, position)?;
                self.history.record_blocks(before, MutationKind::Add);
                debug!("added {} block {:?} at {}", kind, id, position);
                Ok(Effect {
                    added: Some(id),
                    ..Effect::recorded(MutationKind::Add)
                })
            }
            CanvasCommand::UpdateBlock { id, patch } => {
                self.edit_recorded(MutationKind::Update, id, |doc| doc.update_block(&id, &patch))
            }
            CanvasCommand::SetStyle { id, tier, key, value } => self
                .edit_recorded(MutationKind::Style, id, |doc| {
                    doc.set_style(&id, tier, &key, value)
                }),
            CanvasCommand::RemoveStyle { id, tier, key } => self
                .edit_recorded(MutationKind::Style, id, |doc| doc.remove_style(&id, tier, &key)),
            CanvasCommand::RemoveBlock { id } => {
                let effect = self.edit_recorded(MutationKind::Remove, id, |doc| {
                    doc.remove_block(&id).is_some()
                })?;
                if effect.changed && self.selected == Some(id) {
                    self.selected = None;
                }
                Ok(effect)
            }
            CanvasCommand::ReorderBlocks { source, target } => {
                if source == target || source.max(target) >= self.document.len() {
                    // Out of range fails here; equal indices move nothing.
                    self.document.reorder_blocks(source, target)?;
                    return Ok(Effect::unchanged());
                }
                let before = self.snapshot();
                self.document.reorder_blocks(source, target)?;
                self.history.record_blocks(before, MutationKind::Reorder);
                debug!("moved block {} -> {}", source, target);
                Ok(Effect::recorded(MutationKind::Reorder))
            }
            CanvasCommand::SelectBlock { id } => {
                match id {
                    Some(id) if !self.document.contains(&id) => {}
                    _ => self.selected = id,
                }
                Ok(Effect::unchanged())
            }
            CanvasCommand::Undo => {
                let Some(snapshot) = self.history.undo(&self.document) else {
                    return Ok(Effect::unchanged());
                };
                debug!("undo {}", snapshot.mutation);
                self.document.restore(&snapshot.blocks);
                self.drop_stale_selection();
                Ok(Effect { changed: true, ..Effect::default() })
            }
            CanvasCommand::Redo => {
                let Some(snapshot) = self.history.redo(&self.document) else {
                    return Ok(Effect::unchanged());
                };
                debug!("redo {}", snapshot.mutation);
                self.document.restore(&snapshot.blocks);
                self.drop_stale_selection();
                Ok(Effect { changed: true, ..Effect::default() })
            }
            CanvasCommand::Load { blocks } => {
                self.document.load(blocks)?;
                self.history.clear();
                self.resolver.reset();
                self.selected = None;
                Ok(Effect { changed: true, ..Effect::default() })
            }
        }
    }

    /// Resolve a drop gesture and apply the resulting edit.
    ///
    /// A debounced duplicate resolves to an unchanged effect.
    pub fn drop_block(&mut self, event: &DropEvent, now: Instant) -> Result<Effect> {
        match self.resolver.resolve(event, &self.document, now)? {
            Resolution::Move { source, target } => {
                self.dispatch(CanvasCommand::ReorderBlocks { source, target })
            }
            Resolution::Insert { kind, target } => self.dispatch(CanvasCommand::AddBlock {
                kind,
                position: target as i64,
            }),
            Resolution::Debounced => Ok(Effect::unchanged()),
        }
    }

    // =========================================================================
    // Convenience wrappers
    // =========================================================================

    pub fn add_block(&mut self, kind: BlockKind, position: i64) -> Result<BlockId> {
        let effect = self.dispatch(CanvasCommand::AddBlock { kind, position })?;
        // AddBlock always reports the new id on success.
        Ok(effect.added.unwrap_or_else(BlockId::nil))
    }

    pub fn update_block(&mut self, id: BlockId, patch: BlockPatch) -> bool {
        self.dispatch(CanvasCommand::UpdateBlock { id, patch })
            .map(|e| e.changed)
            .unwrap_or(false)
    }

    pub fn remove_block(&mut self, id: BlockId) -> bool {
        self.dispatch(CanvasCommand::RemoveBlock { id })
            .map(|e| e.changed)
            .unwrap_or(false)
    }

    pub fn reorder_blocks(&mut self, source: usize, target: usize) -> Result<bool> {
        self.dispatch(CanvasCommand::ReorderBlocks { source, target })
            .map(|e| e.changed)
    }

    /// Select `id`, or clear with `None`. Unknown ids leave the selection as is.
    pub fn select_block(&mut self, id: Option<BlockId>) {
        // SelectBlock cannot fail.
        let _ = self.dispatch(CanvasCommand::SelectBlock { id });
    }

    pub fn undo(&mut self) -> bool {
        self.dispatch(CanvasCommand::Undo)
            .map(|e| e.changed)
            .unwrap_or(false)
    }

    pub fn redo(&mut self) -> bool {
        self.dispatch(CanvasCommand::Redo)
            .map(|e| e.changed)
            .unwrap_or(false)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Run an in-place edit of block `id`; record the pre-edit state only if
    /// it changed something. Unknown ids return before anything is captured.
    fn edit_recorded(
        &mut self,
        kind: MutationKind,
        id: BlockId,
        edit: impl FnOnce(&mut Document) -> bool,
    ) -> Result<Effect> {
        if !self.document.contains(&id) {
            return Ok(Effect::unchanged());
        }
        let before = self.snapshot();
        if !edit(&mut self.document) {
            return Ok(Effect::unchanged());
        }
        self.history.record_blocks(before, kind);
        Ok(Effect::recorded(kind))
    }

    fn snapshot(&self) -> Arc<[ContentBlock]> {
        Arc::from(self.document.blocks())
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = self.selected
            && !self.document.contains(&id)
        {
            self.selected = None;
        }
    }
}

/// Pure reducer: the state after applying `command` to `canvas`.
pub fn reduce(canvas: &Canvas, command: CanvasCommand) -> Result<(Canvas, Effect)> {
    let mut next = canvas.clone();
    let effect = next.dispatch(command)?;
    Ok((next, effect))
}
