//! Snapshot-based undo/redo.
//!
//! Each recorded entry is a full copy of the block list as it was *before* a
//! mutation. Undo and redo swap whole snapshots, so they stay symmetric no
//! matter how a mutation was implemented.
//!
//! Snapshots hold their blocks in an `Arc<[ContentBlock]>`: immutable once
//! taken, cheap to move between the two stacks, and never aliased by the live
//! document (which owns its own `Vec`).

use std::sync::Arc;

use bistro_types::{ContentBlock, now_millis};
use serde::{Deserialize, Serialize};

use crate::Document;

/// Default cap on undo depth.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Which kind of edit produced a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Add,
    Update,
    Style,
    Remove,
    Reorder,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Add => "add",
            MutationKind::Update => "update",
            MutationKind::Style => "style",
            MutationKind::Remove => "remove",
            MutationKind::Reorder => "reorder",
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable capture of the block list at one point in time.
#[derive(Clone, Debug)]
pub struct HistorySnapshot {
    /// Unix milliseconds when the snapshot was taken.
    pub timestamp: u64,
    pub blocks: Arc<[ContentBlock]>,
    /// The edit this snapshot brackets.
    pub mutation: MutationKind,
}

impl HistorySnapshot {
    pub fn capture(doc: &Document, mutation: MutationKind) -> Self {
        Self::of_blocks(Arc::from(doc.blocks()), mutation)
    }

    /// Wrap an already captured block list without copying it.
    pub fn of_blocks(blocks: Arc<[ContentBlock]>, mutation: MutationKind) -> Self {
        Self {
            timestamp: now_millis(),
            blocks,
            mutation,
        }
    }
}

/// Undo and redo stacks (most recent last).
#[derive(Clone, Debug)]
pub struct History {
    undo_stack: Vec<HistorySnapshot>,
    redo_stack: Vec<HistorySnapshot>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Create an empty history keeping at most `max_depth` undo entries.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the state *before* a forward edit. Invalidates the redo future.
    pub fn record(&mut self, before: &Document, mutation: MutationKind) {
        self.record_blocks(Arc::from(before.blocks()), mutation);
    }

    /// [`record`](Self::record) for a block list the caller captured itself.
    pub fn record_blocks(&mut self, before: Arc<[ContentBlock]>, mutation: MutationKind) {
        self.redo_stack.clear();
        self.push_undo(HistorySnapshot::of_blocks(before, mutation));
    }

    /// Step back. Returns the snapshot to restore, or `None` if there is nothing to undo.
    ///
    /// `current` is pushed onto the redo stack so the step can be replayed.
    pub fn undo(&mut self, current: &Document) -> Option<HistorySnapshot> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack
            .push(HistorySnapshot::capture(current, snapshot.mutation));
        Some(snapshot)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &Document) -> Option<HistorySnapshot> {
        let snapshot = self.redo_stack.pop()?;
        self.push_undo(HistorySnapshot::capture(current, snapshot.mutation));
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Kind of edit the next undo would revert.
    pub fn peek_undo(&self) -> Option<MutationKind> {
        self.undo_stack.last().map(|s| s.mutation)
    }

    /// Drop both stacks (e.g. after loading a different document).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_undo(&mut self, snapshot: HistorySnapshot) {
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > self.max_depth {
            let excess = self.undo_stack.len() - self.max_depth;
            self.undo_stack.drain(..excess);
        }
    }
}
