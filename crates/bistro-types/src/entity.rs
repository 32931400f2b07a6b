//! Server-owned records managed outside the website canvas.
//!
//! Events and locations live in their own collections and are edited through
//! the dashboard with optimistic CRUD. [`RemoteEntity`] is the seam the sync
//! engine is generic over: it knows how to build an optimistic placeholder from
//! a create payload and how to apply a partial update locally.

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// A server-owned record with a client-visible id.
pub trait RemoteEntity: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Create payload (no id; the server assigns one).
    type Draft: Clone + std::fmt::Debug + Send + Sync + 'static;
    /// Partial update payload.
    type Patch: Clone + std::fmt::Debug + Send + Sync + 'static;

    /// Resource name used in logs and notifications ("event", "location").
    const RESOURCE: &'static str;

    fn id(&self) -> &EntityId;

    /// Build the optimistic local stand-in for a create, under a temporary id.
    fn from_draft(id: EntityId, draft: &Self::Draft) -> Self;

    /// Apply a partial update locally (the optimistic guess).
    fn apply_patch(&mut self, patch: &Self::Patch);
}

// ============================================================================
// Event
// ============================================================================

/// A restaurant event (tasting night, live music, private booking).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Unix milliseconds.
    pub starts_at: u64,
    /// Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<EntityId>,
    /// Server-assigned; 0 until the server has seen the record.
    #[serde(default)]
    pub updated_at: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<EntityId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<u64>,
    /// `Some(None)` clears the end time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<Option<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<Option<EntityId>>,
}

impl RemoteEntity for Event {
    type Draft = EventDraft;
    type Patch = EventPatch;

    const RESOURCE: &'static str = "event";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_draft(id: EntityId, draft: &EventDraft) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            location_id: draft.location_id.clone(),
            updated_at: 0,
        }
    }

    fn apply_patch(&mut self, patch: &EventPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(starts_at) = patch.starts_at {
            self.starts_at = starts_at;
        }
        if let Some(ends_at) = patch.ends_at {
            self.ends_at = ends_at;
        }
        if let Some(location_id) = &patch.location_id {
            self.location_id = location_id.clone();
        }
    }
}

// ============================================================================
// Location
// ============================================================================

/// A physical restaurant location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub updated_at: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDraft {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
}

impl RemoteEntity for Location {
    type Draft = LocationDraft;
    type Patch = LocationPatch;

    const RESOURCE: &'static str = "location";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_draft(id: EntityId, draft: &LocationDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            address: draft.address.clone(),
            phone: draft.phone.clone(),
            is_primary: draft.is_primary,
            updated_at: 0,
        }
    }

    fn apply_patch(&mut self, patch: &LocationPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(address) = &patch.address {
            self.address = address.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.clone();
        }
        if let Some(is_primary) = patch.is_primary {
            self.is_primary = is_primary;
        }
    }
}
