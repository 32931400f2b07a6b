//! Remote collaborators: the server side of every suspension point.
//!
//! The engine never talks HTTP itself. It is handed implementations of these
//! traits and treats every failure as an opaque [`TransportError`].

use async_trait::async_trait;
use bistro_types::{ContentBlock, EntityId, RemoteEntity, RestaurantId, TransportError};

/// Stores the whole website document of a restaurant.
#[async_trait]
pub trait WebsiteRemote: Send + Sync {
    /// Fetch the stored blocks. An unknown restaurant yields an empty list.
    async fn fetch(&self, restaurant: RestaurantId) -> Result<Vec<ContentBlock>, TransportError>;

    /// Replace the stored blocks with `blocks`.
    async fn save(
        &self,
        restaurant: RestaurantId,
        blocks: &[ContentBlock],
    ) -> Result<(), TransportError>;
}

/// CRUD endpoint for one entity collection (events, locations).
#[async_trait]
pub trait EntityRemote<E: RemoteEntity>: Send + Sync {
    async fn list(&self) -> Result<Vec<E>, TransportError>;

    /// Create from a draft. Returns the canonical entity with its server id.
    async fn create(&self, draft: &E::Draft) -> Result<E, TransportError>;

    /// Apply `patch` to `id`. Returns the canonical entity.
    async fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E, TransportError>;

    /// Delete `id`. Returns the id the server actually deleted.
    async fn delete(&self, id: &EntityId) -> Result<EntityId, TransportError>;
}
