//! In-process remotes for tests, demos, and offline editing.
//!
//! Both stores can be switched into a failing mode and given an artificial
//! latency, which is enough to exercise every rollback and ordering path of
//! the engine without a server.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bistro_types::{ContentBlock, EntityId, RemoteEntity, RestaurantId, TransportError};
use parking_lot::Mutex;

use crate::remote::{EntityRemote, WebsiteRemote};

/// Shared fault-injection knobs.
#[derive(Debug, Default)]
struct Faults {
    failing: AtomicBool,
    /// Per-call delays, consumed front to back; empty means no delay.
    latencies: Mutex<VecDeque<Duration>>,
}

impl Faults {
    async fn enter(&self, what: &str) -> Result<(), TransportError> {
        let delay = self.latencies.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::new(format!("{what}: simulated failure")));
        }
        Ok(())
    }
}

// ============================================================================
// Website store
// ============================================================================

/// Website documents held in memory, keyed by restaurant.
#[derive(Debug, Default)]
pub struct MemoryWebsiteRemote {
    sites: Mutex<HashMap<RestaurantId, Vec<ContentBlock>>>,
    saves: AtomicUsize,
    faults: Faults,
}

impl MemoryWebsiteRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the stored document for `restaurant`.
    pub fn insert(&self, restaurant: RestaurantId, blocks: Vec<ContentBlock>) {
        self.sites.lock().insert(restaurant, blocks);
    }

    /// Currently stored blocks for `restaurant`.
    pub fn stored(&self, restaurant: RestaurantId) -> Option<Vec<ContentBlock>> {
        self.sites.lock().get(&restaurant).cloned()
    }

    /// Successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.faults.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay the next call by `delay`. Queued delays apply one per call.
    pub fn push_latency(&self, delay: Duration) {
        self.faults.latencies.lock().push_back(delay);
    }
}

#[async_trait]
impl WebsiteRemote for MemoryWebsiteRemote {
    async fn fetch(&self, restaurant: RestaurantId) -> Result<Vec<ContentBlock>, TransportError> {
        self.faults.enter("fetch").await?;
        Ok(self.stored(restaurant).unwrap_or_default())
    }

    async fn save(
        &self,
        restaurant: RestaurantId,
        blocks: &[ContentBlock],
    ) -> Result<(), TransportError> {
        self.faults.enter("save").await?;
        self.sites.lock().insert(restaurant, blocks.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Entity store
// ============================================================================

/// One entity collection held in memory. Ids are `<resource>_<n>`.
#[derive(Debug)]
pub struct MemoryEntityRemote<E> {
    items: Mutex<Vec<E>>,
    next_id: AtomicU64,
    faults: Faults,
}

impl<E: RemoteEntity> Default for MemoryEntityRemote<E> {
    fn default() -> Self {
        Self::with_items(Vec::new())
    }
}

impl<E: RemoteEntity> MemoryEntityRemote<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<E>) -> Self {
        Self {
            next_id: AtomicU64::new(items.len() as u64 + 1),
            items: Mutex::new(items),
            faults: Faults::default(),
        }
    }

    /// Server-side view of the collection.
    pub fn stored(&self) -> Vec<E> {
        self.items.lock().clone()
    }

    /// Replace the server-side collection.
    pub fn replace(&self, items: Vec<E>) {
        *self.items.lock() = items;
    }

    pub fn set_failing(&self, failing: bool) {
        self.faults.failing.store(failing, Ordering::SeqCst);
    }

    pub fn push_latency(&self, delay: Duration) {
        self.faults.latencies.lock().push_back(delay);
    }

    fn not_found(id: &EntityId) -> TransportError {
        TransportError::new(format!("404: {} {} not found", E::RESOURCE, id))
    }
}

#[async_trait]
impl<E: RemoteEntity> EntityRemote<E> for MemoryEntityRemote<E> {
    async fn list(&self) -> Result<Vec<E>, TransportError> {
        self.faults.enter("list").await?;
        Ok(self.stored())
    }

    async fn create(&self, draft: &E::Draft) -> Result<E, TransportError> {
        self.faults.enter("create").await?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let entity = E::from_draft(EntityId::new(format!("{}_{n}", E::RESOURCE)), draft);
        self.items.lock().push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E, TransportError> {
        self.faults.enter("update").await?;
        let mut items = self.items.lock();
        let entity = items
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        entity.apply_patch(patch);
        Ok(entity.clone())
    }

    async fn delete(&self, id: &EntityId) -> Result<EntityId, TransportError> {
        self.faults.enter("delete").await?;
        let mut items = self.items.lock();
        let index = items
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        items.remove(index);
        Ok(id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_types::{BlockKind, Event, EventDraft};

    #[tokio::test]
    async fn test_website_store_round_trip() {
        let remote = MemoryWebsiteRemote::new();
        let restaurant = RestaurantId::new();
        assert!(remote.fetch(restaurant).await.unwrap().is_empty());

        let blocks = vec![ContentBlock::new(BlockKind::Header)];
        remote.save(restaurant, &blocks).await.unwrap();
        assert_eq!(remote.fetch(restaurant).await.unwrap(), blocks);
        assert_eq!(remote.save_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_store_reports_transport_error() {
        let remote = MemoryWebsiteRemote::new();
        remote.set_failing(true);
        let err = remote.save(RestaurantId::new(), &[]).await.unwrap_err();
        assert!(err.message().contains("simulated"));
        assert_eq!(remote.save_count(), 0);
    }

    #[tokio::test]
    async fn test_entity_store_assigns_ids() {
        let remote = MemoryEntityRemote::<Event>::new();
        let draft = EventDraft {
            title: "Jazz night".into(),
            ..Default::default()
        };
        let a = remote.create(&draft).await.unwrap();
        let b = remote.create(&draft).await.unwrap();
        assert_eq!(a.id.as_str(), "event_1");
        assert_eq!(b.id.as_str(), "event_2");

        assert_eq!(remote.delete(&a.id).await.unwrap(), a.id);
        assert!(remote.delete(&a.id).await.is_err());
        assert_eq!(remote.list().await.unwrap(), vec![b]);
    }
}
