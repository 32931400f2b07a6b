//! Content-block document model for the bistro site editor.
//!
//! A restaurant website is an ordered list of [`ContentBlock`]s. This crate
//! owns the editing semantics on that list: positional insert, patching,
//! per-tier styles, removal, reordering, and snapshot-based undo/redo. It does
//! no I/O; persistence lives in `bistro-client`.
//!
//! # Layers
//!
//! - [`Document`]: the block list. Keeps `order` dense (`order == index`).
//! - [`History`]: bounded undo/redo stacks of whole-document snapshots.
//! - [`ReorderResolver`]: turns drop-zone gestures into concrete indices and
//!   folds duplicate deliveries of the same gesture.
//! - [`Canvas`]: ties the three together behind one [`CanvasCommand`] enum.
//!
//! # Invariants
//!
//! - After every successful command, block orders are `0..len` in list order.
//! - Every forward edit that changes the document pushes exactly one
//!   snapshot; edits that match nothing push none.
//! - A new forward edit discards the redo stack.
//! - Selection never enters history.

mod command;
mod document;
mod error;
mod history;
mod reorder;

pub use bistro_types::{BlockId, BlockKind, BlockPatch, ContentBlock, DeviceTier, GestureId, StyleMap};
pub use command::{Canvas, CanvasCommand, Effect, reduce};
pub use document::{Document, resolve_styles};
pub use error::CanvasError;
pub use history::{DEFAULT_HISTORY_LIMIT, History, HistorySnapshot, MutationKind};
pub use reorder::{
    AcceptSet, DEFAULT_DROP_DEBOUNCE, DragItem, DropEvent, DropZone, ReorderResolver, Resolution,
    target_index,
};

/// Result type for canvas operations.
pub type Result<T> = std::result::Result<T, CanvasError>;
