//! Document model — the ordered block collection of one website.
//!
//! Blocks are stored in visual order and every block's `order` equals its
//! index, so the order values are always dense and pairwise distinct. Every
//! mutating operation re-sequences the affected tail before returning.
//!
//! Style resolution lives here too: [`resolve_styles`] layers a tier's override
//! map over the desktop base.

use std::collections::HashSet;

use bistro_types::{BlockId, BlockKind, BlockPatch, ContentBlock, DeviceTier, StyleMap};
use tracing::trace;

use crate::{CanvasError, Result};

/// Ordered collection of [`ContentBlock`]s.
///
/// Equality compares blocks only; the version counter is bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct Document {
    /// Blocks in visual order; `blocks[i].order == i`.
    blocks: Vec<ContentBlock>,

    /// Bumped on every successful mutation.
    version: u64,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from blocks as delivered by the store.
    ///
    /// See [`Document::load`] for ordering rules.
    pub fn from_blocks(blocks: Vec<ContentBlock>) -> Result<Self> {
        let mut doc = Self::new();
        doc.load(blocks)?;
        Ok(doc)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Blocks in visual order.
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Current version (bumped on any mutation).
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, id: &BlockId) -> Option<&ContentBlock> {
        self.blocks.iter().find(|b| b.id == *id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.index_of(id).is_some()
    }

    /// Visual index of a block.
    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == *id)
    }

    /// Block kinds in visual order.
    pub fn kinds(&self) -> Vec<BlockKind> {
        self.blocks.iter().map(|b| b.kind).collect()
    }

    /// Effective styles of a block on a device tier.
    pub fn resolved_styles(&self, id: &BlockId, tier: DeviceTier) -> Option<StyleMap> {
        self.get(id).map(|b| resolve_styles(b, tier))
    }

    /// Check the order invariant: `order` values strictly ascend in visual order.
    pub fn order_is_consistent(&self) -> bool {
        self.blocks.windows(2).all(|w| w[0].order < w[1].order)
            && self.blocks.iter().enumerate().all(|(i, b)| b.order as usize == i)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replace the contents with blocks from the store.
    ///
    /// Blocks are sorted by `(order, id)` — the id breaks ties between equal
    /// order values — and then renumbered densely. Duplicate ids are rejected
    /// and leave the document untouched.
    pub fn load(&mut self, mut blocks: Vec<ContentBlock>) -> Result<()> {
        let mut seen = HashSet::with_capacity(blocks.len());
        for block in &blocks {
            if !seen.insert(block.id) {
                return Err(CanvasError::DuplicateBlock(block.id));
            }
        }

        blocks.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));
        self.blocks = blocks;
        self.renumber_from(0);
        self.version += 1;
        Ok(())
    }

    /// Swap in a previously captured block list (history restore).
    pub(crate) fn restore(&mut self, blocks: &[ContentBlock]) {
        self.blocks = blocks.to_vec();
        self.version += 1;
        debug_assert!(self.order_is_consistent());
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a block of `kind` and insert it at `position`.
    ///
    /// Blocks at or after `position` shift forward by one.
    pub fn add_block(&mut self, kind: BlockKind, position: i64) -> Result<BlockId> {
        self.insert_block(ContentBlock::new(kind), position)
    }

    /// Insert a caller-built block at `position`.
    pub fn insert_block(&mut self, mut block: ContentBlock, position: i64) -> Result<BlockId> {
        let index = self.check_position(position)?;
        if self.contains(&block.id) {
            return Err(CanvasError::DuplicateBlock(block.id));
        }

        let id = block.id;
        block.order = index as u32;
        self.blocks.insert(index, block);
        self.renumber_from(index);
        self.version += 1;
        trace!("inserted block {:?} at {}", id, index);
        Ok(id)
    }

    /// Merge `patch` into the block with `id`.
    ///
    /// Returns `false` if no block matched or the patch changed nothing.
    pub fn update_block(&mut self, id: &BlockId, patch: &BlockPatch) -> bool {
        let Some(block) = self.blocks.iter_mut().find(|b| b.id == *id) else {
            return false;
        };
        let changed = block.apply_patch(patch);
        if changed {
            self.version += 1;
        }
        changed
    }

    /// Set one style property on one tier's layer.
    pub fn set_style(
        &mut self,
        id: &BlockId,
        tier: DeviceTier,
        key: &str,
        value: serde_json::Value,
    ) -> bool {
        let Some(block) = self.blocks.iter_mut().find(|b| b.id == *id) else {
            return false;
        };
        let layer = block.styles_for_mut(tier);
        if layer.get(key) == Some(&value) {
            return false;
        }
        layer.insert(key.to_string(), value);
        self.version += 1;
        true
    }

    /// Remove one style property from one tier's layer.
    pub fn remove_style(&mut self, id: &BlockId, tier: DeviceTier, key: &str) -> bool {
        let Some(block) = self.blocks.iter_mut().find(|b| b.id == *id) else {
            return false;
        };
        if block.styles_for_mut(tier).shift_remove(key).is_none() {
            return false;
        }
        self.version += 1;
        true
    }

    /// Remove a block and close the gap. `None` if the id is absent.
    pub fn remove_block(&mut self, id: &BlockId) -> Option<ContentBlock> {
        let index = self.index_of(id)?;
        let removed = self.blocks.remove(index);
        self.renumber_from(index);
        self.version += 1;
        Some(removed)
    }

    /// Move the block at `source` so it ends up at index `target`.
    ///
    /// Returns `Ok(false)` when the indices are equal (nothing moves).
    pub fn reorder_blocks(&mut self, source: usize, target: usize) -> Result<bool> {
        let len = self.blocks.len();
        for index in [source, target] {
            if index >= len {
                return Err(CanvasError::IndexOutOfRange { index, len });
            }
        }
        if source == target {
            return Ok(false);
        }

        let block = self.blocks.remove(source);
        self.blocks.insert(target, block);
        self.renumber_from(source.min(target));
        self.version += 1;
        Ok(true)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    pub(crate) fn check_position(&self, position: i64) -> Result<usize> {
        let len = self.blocks.len();
        match usize::try_from(position) {
            Ok(index) if index <= len => Ok(index),
            _ => Err(CanvasError::InvalidPosition { position, len }),
        }
    }

    fn renumber_from(&mut self, start: usize) {
        for (i, block) in self.blocks.iter_mut().enumerate().skip(start) {
            block.order = i as u32;
        }
        debug_assert!(self.order_is_consistent());
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.blocks == other.blocks
    }
}

/// Effective style map of `block` on `tier`.
///
/// Desktop returns the base layer unchanged. Tablet and mobile shallow-merge
/// their own override layer on top of the base (override keys win). The tiers
/// are independent: mobile does not inherit tablet overrides.
pub fn resolve_styles(block: &ContentBlock, tier: DeviceTier) -> StyleMap {
    let mut resolved = block.styles.clone();
    if tier != DeviceTier::Desktop {
        for (key, value) in block.styles_for(tier) {
            resolved.insert(key.clone(), value.clone());
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc_with(kinds: &[BlockKind]) -> Document {
        let mut doc = Document::new();
        for (i, kind) in kinds.iter().enumerate() {
            doc.add_block(*kind, i as i64).unwrap();
        }
        doc
    }

    fn orders(doc: &Document) -> Vec<u32> {
        doc.blocks().iter().map(|b| b.order).collect()
    }

    #[test]
    fn test_add_block_shifts_tail() {
        let mut doc = doc_with(&[BlockKind::Header, BlockKind::Footer]);
        let id = doc.add_block(BlockKind::Menu, 1).unwrap();

        assert_eq!(
            doc.kinds(),
            vec![BlockKind::Header, BlockKind::Menu, BlockKind::Footer]
        );
        assert_eq!(orders(&doc), vec![0, 1, 2]);
        assert_eq!(doc.index_of(&id), Some(1));
        assert_eq!(doc.get(&id).unwrap().content, BlockKind::Menu.default_content());
    }

    #[test]
    fn test_add_block_at_end_and_start() {
        let mut doc = Document::new();
        doc.add_block(BlockKind::Hours, 0).unwrap();
        doc.add_block(BlockKind::Hero, 0).unwrap();
        doc.add_block(BlockKind::Footer, 2).unwrap();
        assert_eq!(
            doc.kinds(),
            vec![BlockKind::Hero, BlockKind::Hours, BlockKind::Footer]
        );
    }

    #[test]
    fn test_add_block_invalid_position() {
        let mut doc = doc_with(&[BlockKind::Header]);
        let before = doc.clone();

        assert_eq!(
            doc.add_block(BlockKind::Menu, -1),
            Err(CanvasError::InvalidPosition { position: -1, len: 1 })
        );
        assert_eq!(
            doc.add_block(BlockKind::Menu, 2),
            Err(CanvasError::InvalidPosition { position: 2, len: 1 })
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn test_insert_duplicate_rejected() {
        let mut doc = Document::new();
        let block = ContentBlock::new(BlockKind::Text);
        doc.insert_block(block.clone(), 0).unwrap();
        assert_eq!(
            doc.insert_block(block.clone(), 1),
            Err(CanvasError::DuplicateBlock(block.id))
        );
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_update_block_missing_is_noop() {
        let mut doc = doc_with(&[BlockKind::Header]);
        let version = doc.version();
        assert!(!doc.update_block(&BlockId::new(), &BlockPatch::new().visible(false)));
        assert_eq!(doc.version(), version);
    }

    #[test]
    fn test_update_block_merges() {
        let mut doc = doc_with(&[BlockKind::Header]);
        let id = doc.blocks()[0].id;
        assert!(doc.update_block(&id, &BlockPatch::new().visible(false)));
        assert!(!doc.get(&id).unwrap().is_visible);
        // Unchanged fields stay put.
        assert_eq!(doc.get(&id).unwrap().kind, BlockKind::Header);
        assert_eq!(doc.get(&id).unwrap().order, 0);
    }

    #[test]
    fn test_remove_block_closes_gap() {
        let mut doc = doc_with(&[BlockKind::Header, BlockKind::Menu, BlockKind::Footer]);
        let menu = doc.blocks()[1].id;

        let removed = doc.remove_block(&menu).unwrap();
        assert_eq!(removed.kind, BlockKind::Menu);
        assert_eq!(doc.kinds(), vec![BlockKind::Header, BlockKind::Footer]);
        assert_eq!(orders(&doc), vec![0, 1]);

        assert!(doc.remove_block(&menu).is_none());
    }

    #[test]
    fn test_reorder_forward_and_back() {
        let mut doc = doc_with(&[BlockKind::Header, BlockKind::Menu, BlockKind::Footer]);
        assert_eq!(doc.reorder_blocks(0, 2), Ok(true));
        assert_eq!(
            doc.kinds(),
            vec![BlockKind::Menu, BlockKind::Footer, BlockKind::Header]
        );
        assert_eq!(doc.reorder_blocks(2, 0), Ok(true));
        assert_eq!(
            doc.kinds(),
            vec![BlockKind::Header, BlockKind::Menu, BlockKind::Footer]
        );
        assert_eq!(orders(&doc), vec![0, 1, 2]);
    }

    #[test]
    fn test_reorder_out_of_range() {
        let mut doc = doc_with(&[BlockKind::Header, BlockKind::Menu]);
        assert_eq!(
            doc.reorder_blocks(2, 0),
            Err(CanvasError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            doc.reorder_blocks(0, 5),
            Err(CanvasError::IndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(doc.reorder_blocks(1, 1), Ok(false));
    }

    #[test]
    fn test_load_sorts_and_renumbers_sparse_orders() {
        let mut a = ContentBlock::new(BlockKind::Footer);
        a.order = 40;
        let mut b = ContentBlock::new(BlockKind::Header);
        b.id = BlockId::from(uuid::Uuid::from_u128(1));
        b.order = 10;
        let mut c = ContentBlock::new(BlockKind::Menu);
        c.id = BlockId::from(uuid::Uuid::from_u128(2));
        c.order = 10;

        let doc = Document::from_blocks(vec![a, c.clone(), b.clone()]).unwrap();
        assert_eq!(orders(&doc), vec![0, 1, 2]);
        // Equal order: the lower id wins.
        assert_eq!(doc.blocks()[0].id, b.id);
        assert_eq!(doc.blocks()[1].id, c.id);
        assert_eq!(doc.blocks()[2].kind, BlockKind::Footer);
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let block = ContentBlock::new(BlockKind::Text);
        let mut doc = doc_with(&[BlockKind::Header]);
        let before = doc.clone();
        assert_eq!(
            doc.load(vec![block.clone(), block.clone()]),
            Err(CanvasError::DuplicateBlock(block.id))
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn test_set_and_remove_style() {
        let mut doc = doc_with(&[BlockKind::Hero]);
        let id = doc.blocks()[0].id;

        assert!(doc.set_style(&id, DeviceTier::Mobile, "fontSize", json!("14px")));
        assert!(!doc.set_style(&id, DeviceTier::Mobile, "fontSize", json!("14px")));
        assert_eq!(doc.get(&id).unwrap().mobile_styles["fontSize"], "14px");

        assert!(doc.remove_style(&id, DeviceTier::Mobile, "fontSize"));
        assert!(!doc.remove_style(&id, DeviceTier::Mobile, "fontSize"));
        assert!(!doc.set_style(&BlockId::new(), DeviceTier::Desktop, "color", json!("red")));
    }

    #[test]
    fn test_resolve_styles_per_tier() {
        let mut block = ContentBlock::new(BlockKind::Menu);
        block.styles.insert("color".into(), json!("black"));
        block.styles.insert("padding".into(), json!("32px"));
        block.tablet_styles.insert("padding".into(), json!("16px"));
        block.mobile_styles.insert("padding".into(), json!("8px"));
        block.mobile_styles.insert("columns".into(), json!(1));

        assert_eq!(resolve_styles(&block, DeviceTier::Desktop), block.styles);

        let tablet = resolve_styles(&block, DeviceTier::Tablet);
        assert_eq!(tablet["padding"], "16px");
        assert_eq!(tablet["color"], "black");
        assert!(!tablet.contains_key("columns"));

        let mobile = resolve_styles(&block, DeviceTier::Mobile);
        assert_eq!(mobile["padding"], "8px");
        assert_eq!(mobile["columns"], 1);
        assert_eq!(mobile["color"], "black");
    }
}
