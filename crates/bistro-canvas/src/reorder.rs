//! Drag-and-drop → concrete `(source, target)` indices.
//!
//! Drop zones are interleaved with the blocks: zone `z` sits just before block
//! `z`, and zone `N` sits after the last block, so a document with `N` blocks
//! has zones `0..=N`.
//!
//! ```text
//!   z0 [block 0] z1 [block 1] z2 [block 2] z3
//! ```
//!
//! Moving an existing block removes it before reinserting, which shifts every
//! later zone down by one. Hence the asymmetry in [`target_index`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bistro_types::{BlockKind, GestureId};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{CanvasError, Document, Result};

/// Duplicate drops of one gesture inside this window collapse into one.
pub const DEFAULT_DROP_DEBOUNCE: Duration = Duration::from_millis(200);

/// What is being dragged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DragItem {
    /// A block already on the canvas, at this visual index.
    Existing { index: usize },
    /// A new block dragged in from the palette.
    New { kind: BlockKind },
}

/// Block kinds a drop zone will take.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptSet {
    #[default]
    Any,
    Only(Vec<BlockKind>),
}

impl AcceptSet {
    pub fn accepts(&self, kind: BlockKind) -> bool {
        match self {
            AcceptSet::Any => true,
            AcceptSet::Only(kinds) => kinds.contains(&kind),
        }
    }
}

/// An insertion slot between or around blocks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropZone {
    pub index: usize,
    #[serde(default)]
    pub accepts: AcceptSet,
}

impl DropZone {
    /// A zone that accepts every block kind.
    pub fn open(index: usize) -> Self {
        Self { index, accepts: AcceptSet::Any }
    }
}

/// Pointer released over a drop zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvent {
    pub gesture: GestureId,
    pub item: DragItem,
    pub zone: DropZone,
}

/// What a drop should do to the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Reorder an existing block.
    Move { source: usize, target: usize },
    /// Insert a new block of `kind` at `target`.
    Insert { kind: BlockKind, target: usize },
    /// Repeat delivery of an already-resolved gesture; apply nothing.
    Debounced,
}

/// Target index for a drop on `zone`.
///
/// For an existing block at `source`, zones after it lose one slot once the
/// block is lifted out. A new block (no source) lands on the zone index as is.
pub fn target_index(source: Option<usize>, zone: usize) -> usize {
    match source {
        Some(s) if zone > s => zone - 1,
        _ => zone,
    }
}

/// Resolves drop events and folds duplicate deliveries of one gesture.
#[derive(Clone, Debug)]
pub struct ReorderResolver {
    window: Duration,
    /// Gestures resolved within the window, with the time of their drop.
    recent: HashMap<GestureId, Instant>,
}

impl Default for ReorderResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DROP_DEBOUNCE)
    }
}

impl ReorderResolver {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            recent: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Resolve `event` against `doc` as of `now`.
    ///
    /// Fails without arming the debounce when the zone or source index is out
    /// of range, or when the zone refuses the dragged block's kind.
    pub fn resolve(&mut self, event: &DropEvent, doc: &Document, now: Instant) -> Result<Resolution> {
        let window = self.window;
        self.recent
            .retain(|_, at| now.saturating_duration_since(*at) < window);
        if self.recent.contains_key(&event.gesture) {
            trace!("debounced duplicate drop for gesture {:?}", event.gesture);
            return Ok(Resolution::Debounced);
        }

        let len = doc.len();
        let zone = event.zone.index;
        if zone > len {
            return Err(CanvasError::IndexOutOfRange { index: zone, len });
        }

        let resolution = match &event.item {
            DragItem::Existing { index } => {
                let source = *index;
                let block = doc
                    .blocks()
                    .get(source)
                    .ok_or(CanvasError::IndexOutOfRange { index: source, len })?;
                check_accepts(&event.zone, block.kind)?;
                Resolution::Move {
                    source,
                    target: target_index(Some(source), zone),
                }
            }
            DragItem::New { kind } => {
                check_accepts(&event.zone, *kind)?;
                Resolution::Insert {
                    kind: *kind,
                    target: target_index(None, zone),
                }
            }
        };

        self.recent.insert(event.gesture, now);
        Ok(resolution)
    }

    /// Forget every remembered gesture (e.g. after the document is reloaded).
    pub fn reset(&mut self) {
        self.recent.clear();
    }
}

fn check_accepts(zone: &DropZone, kind: BlockKind) -> Result<()> {
    if zone.accepts.accepts(kind) {
        Ok(())
    } else {
        Err(CanvasError::validation(
            "type",
            format!("drop zone {} does not accept {} blocks", zone.index, kind),
        ))
    }
}
