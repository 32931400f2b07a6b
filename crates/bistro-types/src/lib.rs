//! Shared identity, block, and entity types for bistro.
//!
//! This is the leaf crate of the workspace: typed IDs, the content block model
//! of a restaurant website, and the remote entities (events, locations) the
//! dashboard edits. It has **no internal bistro dependencies**.
//!
//! # Key Types
//!
//! |-------------------|----------------------------------------------|
//! | Type              | Purpose                                      |
//! |-------------------|----------------------------------------------|
//! | [`RestaurantId`]  | Which tenant / website document              |
//! | [`BlockId`]       | Client-generated content block identity      |
//! | [`GestureId`]     | One drag-and-drop gesture                    |
//! | [`EntityId`]      | Server id (or `tmp-` placeholder) of a record|
//! | [`ContentBlock`]  | One visual unit of the website               |
//! | [`BlockPatch`]    | Partial update for a block                   |
//! | [`RemoteEntity`]  | Seam for optimistic CRUD collections         |
//! | [`TransportError`]| Opaque remote call failure                   |
//! |-------------------|----------------------------------------------|

pub mod block;
pub mod entity;
pub mod error;
pub mod ids;

pub use block::{BlockKind, BlockPatch, ContentBlock, DeviceTier, StyleMap};
pub use entity::{
    Event, EventDraft, EventPatch, Location, LocationDraft, LocationPatch, RemoteEntity,
};
pub use error::TransportError;
pub use ids::{BlockId, EntityId, GestureId, RestaurantId, TEMP_ID_PREFIX};

/// Current time as Unix milliseconds. Used for snapshots and save stamps.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
