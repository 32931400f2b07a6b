//! Content blocks: the visual units of a restaurant website document.
//!
//! A [`ContentBlock`] carries a kind, a position (`order`) among its siblings,
//! an opaque content payload, a visibility toggle, and three style layers —
//! one per [`DeviceTier`]. Desktop `styles` are the base; `tablet_styles` and
//! `mobile_styles` are independent deltas merged on top of it.
//!
//! Field names serialize in camelCase to match the website store's JSON layout
//! (`isVisible`, `tabletStyles`, `mobileStyles`), and the kind serializes as `type`.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::BlockId;

/// A style override layer: CSS-like property name → value.
///
/// Insertion-ordered so round-trips through the store keep authoring order.
pub type StyleMap = IndexMap<String, serde_json::Value>;

/// What a block *is*. Closed set; rendering is keyed off this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum BlockKind {
    /// Site header with restaurant name and navigation.
    #[default]
    Header,
    /// Large banner image with a call to action.
    Hero,
    /// Menu sections and items.
    Menu,
    /// Photo gallery.
    Gallery,
    /// Contact details and form.
    Contact,
    /// Upcoming events list (backed by the events collection).
    Events,
    /// Opening hours.
    Hours,
    /// Free-form rich text.
    #[strum(serialize = "text", serialize = "richtext")]
    Text,
    /// Location cards (backed by the locations collection).
    Locations,
    /// Site footer.
    Footer,
}

impl BlockKind {
    /// Every kind, in palette order.
    pub const ALL: [BlockKind; 10] = [
        BlockKind::Header,
        BlockKind::Hero,
        BlockKind::Menu,
        BlockKind::Gallery,
        BlockKind::Contact,
        BlockKind::Events,
        BlockKind::Hours,
        BlockKind::Text,
        BlockKind::Locations,
        BlockKind::Footer,
    ];

    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Header => "header",
            BlockKind::Hero => "hero",
            BlockKind::Menu => "menu",
            BlockKind::Gallery => "gallery",
            BlockKind::Contact => "contact",
            BlockKind::Events => "events",
            BlockKind::Hours => "hours",
            BlockKind::Text => "text",
            BlockKind::Locations => "locations",
            BlockKind::Footer => "footer",
        }
    }

    /// Starter payload for a freshly added block of this kind.
    pub fn default_content(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            BlockKind::Header => json!({ "title": "Restaurant name", "links": [] }),
            BlockKind::Hero => json!({ "headline": "", "image": null, "cta": null }),
            BlockKind::Menu => json!({ "title": "Menu", "sections": [] }),
            BlockKind::Gallery => json!({ "images": [] }),
            BlockKind::Contact => json!({ "email": "", "phone": "", "showForm": true }),
            BlockKind::Events => json!({ "title": "Upcoming events", "limit": 3 }),
            BlockKind::Hours => json!({ "days": [] }),
            BlockKind::Text => json!({ "html": "" }),
            BlockKind::Locations => json!({ "title": "Find us" }),
            BlockKind::Footer => json!({ "text": "" }),
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Breakpoint tier a style layer applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum DeviceTier {
    /// Base layer; no overrides.
    #[default]
    Desktop,
    Tablet,
    #[strum(serialize = "mobile", serialize = "phone")]
    Mobile,
}

impl DeviceTier {
    /// Parse from string (case-insensitive). Accepts "phone" for mobile.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceTier::Desktop => "desktop",
            DeviceTier::Tablet => "tablet",
            DeviceTier::Mobile => "mobile",
        }
    }
}

impl std::fmt::Display for DeviceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One visual unit of the website document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    /// Immutable for the block's lifetime.
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Position among siblings. Unique within a document.
    pub order: u32,
    /// Block-type-specific payload; not interpreted by the engine.
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub styles: StyleMap,
    #[serde(default)]
    pub tablet_styles: StyleMap,
    #[serde(default)]
    pub mobile_styles: StyleMap,
}

fn default_visible() -> bool {
    true
}

impl ContentBlock {
    /// Create a visible block with a fresh id and the kind's starter content.
    ///
    /// `order` is left at 0; the document assigns the real position on insert.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: BlockId::new(),
            kind,
            order: 0,
            content: kind.default_content(),
            is_visible: true,
            styles: StyleMap::new(),
            tablet_styles: StyleMap::new(),
            mobile_styles: StyleMap::new(),
        }
    }

    /// The override layer for a tier. Desktop returns the base layer.
    pub fn styles_for(&self, tier: DeviceTier) -> &StyleMap {
        match tier {
            DeviceTier::Desktop => &self.styles,
            DeviceTier::Tablet => &self.tablet_styles,
            DeviceTier::Mobile => &self.mobile_styles,
        }
    }

    pub fn styles_for_mut(&mut self, tier: DeviceTier) -> &mut StyleMap {
        match tier {
            DeviceTier::Desktop => &mut self.styles,
            DeviceTier::Tablet => &mut self.tablet_styles,
            DeviceTier::Mobile => &mut self.mobile_styles,
        }
    }

    /// Merge a partial update into this block. Returns whether anything changed.
    pub fn apply_patch(&mut self, patch: &BlockPatch) -> bool {
        let mut changed = false;
        if let Some(content) = &patch.content
            && self.content != *content
        {
            self.content = content.clone();
            changed = true;
        }
        if let Some(visible) = patch.is_visible
            && self.is_visible != visible
        {
            self.is_visible = visible;
            changed = true;
        }
        if let Some(styles) = &patch.styles
            && self.styles != *styles
        {
            self.styles = styles.clone();
            changed = true;
        }
        if let Some(styles) = &patch.tablet_styles
            && self.tablet_styles != *styles
        {
            self.tablet_styles = styles.clone();
            changed = true;
        }
        if let Some(styles) = &patch.mobile_styles
            && self.mobile_styles != *styles
        {
            self.mobile_styles = styles.clone();
            changed = true;
        }
        changed
    }
}

/// Partial update for a [`ContentBlock`]. `None` fields are left untouched.
///
/// `id`, `kind`, and `order` are deliberately absent: identity is immutable and
/// position only changes through reordering.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablet_styles: Option<StyleMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_styles: Option<StyleMap>,
}

impl BlockPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: serde_json::Value) -> Self {
        self.content = Some(content);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.is_visible = Some(visible);
        self
    }

    /// Replace the whole style layer for one tier.
    pub fn styles(mut self, tier: DeviceTier, styles: StyleMap) -> Self {
        match tier {
            DeviceTier::Desktop => self.styles = Some(styles),
            DeviceTier::Tablet => self.tablet_styles = Some(styles),
            DeviceTier::Mobile => self.mobile_styles = Some(styles),
        }
        self
    }

    /// True if the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.is_visible.is_none()
            && self.styles.is_none()
            && self.tablet_styles.is_none()
            && self.mobile_styles.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_parse_aliases() {
        assert_eq!(BlockKind::from_str("MENU"), Some(BlockKind::Menu));
        assert_eq!(BlockKind::from_str("richtext"), Some(BlockKind::Text));
        assert_eq!(BlockKind::from_str("carousel"), None);
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_tier_parse() {
        assert_eq!(DeviceTier::from_str("Phone"), Some(DeviceTier::Mobile));
        assert_eq!(DeviceTier::from_str("tablet"), Some(DeviceTier::Tablet));
        assert_eq!(DeviceTier::default(), DeviceTier::Desktop);
    }

    #[test]
    fn test_block_wire_layout() {
        let mut block = ContentBlock::new(BlockKind::Hours);
        block.mobile_styles.insert("padding".into(), json!("8px"));
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "hours");
        assert_eq!(value["isVisible"], true);
        assert_eq!(value["mobileStyles"]["padding"], "8px");
        assert!(value.get("tabletStyles").is_some());
    }

    #[test]
    fn test_block_deserialize_fills_defaults() {
        let id = BlockId::new();
        let raw = json!({ "id": id, "type": "gallery", "order": 4 });
        let block: ContentBlock = serde_json::from_value(raw).unwrap();
        assert_eq!(block.kind, BlockKind::Gallery);
        assert!(block.is_visible);
        assert!(block.styles.is_empty());
        assert_eq!(block.content, serde_json::Value::Null);
    }

    #[test]
    fn test_apply_patch_reports_change() {
        let mut block = ContentBlock::new(BlockKind::Text);
        assert!(!block.apply_patch(&BlockPatch::new()));
        assert!(!block.apply_patch(&BlockPatch::new().visible(true)));

        let patch = BlockPatch::new()
            .visible(false)
            .content(json!({ "html": "<p>Hi</p>" }));
        assert!(block.apply_patch(&patch));
        assert!(!block.is_visible);
        assert_eq!(block.content["html"], "<p>Hi</p>");

        // Same patch again is a no-op.
        assert!(!block.apply_patch(&patch));
    }

    #[test]
    fn test_patch_style_layer_targets_tier() {
        let mut tablet = StyleMap::new();
        tablet.insert("columns".into(), json!(2));
        let patch = BlockPatch::new().styles(DeviceTier::Tablet, tablet.clone());
        assert_eq!(patch.tablet_styles, Some(tablet));
        assert!(patch.styles.is_none());
        assert!(!patch.is_empty());
    }
}
