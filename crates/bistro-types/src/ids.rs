//! Typed identifiers for restaurants, blocks, drag gestures, and remote entities.
//!
//! UUID-backed IDs (`RestaurantId`, `BlockId`, `GestureId`) wrap UUIDv7 so they
//! sort by creation time. They display as standard UUID text for logging; the
//! `short()` form (first 8 hex chars) is for human-facing output only.
//!
//! [`EntityId`] is different: events and locations are keyed by whatever the
//! server hands back, so it wraps an opaque string. Optimistic creates mint a
//! temporary id with the [`TEMP_ID_PREFIX`] until the server assigns the real one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A restaurant (tenant) identifier. One restaurant owns one website document.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestaurantId(uuid::Uuid);

/// A content block identifier (UUIDv7), generated client-side on creation.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(uuid::Uuid);

/// Identifies one drag-and-drop gesture, so duplicate drop deliveries can be folded.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GestureId(uuid::Uuid);

// ── Shared behavior ─────────────────────────────────────────────────────────

macro_rules! impl_typed_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// Create a new time-ordered ID (UUIDv7).
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// First 8 hex characters — for human display only, not lookup.
            pub fn short(&self) -> String {
                self.0.as_simple().to_string()[..8].to_string()
            }

            /// Full 32-character hex string (no hyphens).
            pub fn to_hex(&self) -> String {
                self.0.as_simple().to_string()
            }

            /// Parse from a hex string (32 chars, no hyphens) or standard UUID format.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                uuid::Uuid::parse_str(s).map(Self)
            }

            /// A nil / zero ID — for sentinel values only.
            pub fn nil() -> Self {
                Self(uuid::Uuid::nil())
            }

            /// Check if this is the nil ID.
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl std::str::FromStr for $T {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl Default for $T {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $T {
            fn from(u: uuid::Uuid) -> Self {
                Self(u)
            }
        }

        impl From<$T> for uuid::Uuid {
            fn from(id: $T) -> uuid::Uuid {
                id.0
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Full UUID with hyphens for log readability
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $name, self.short())
            }
        }
    };
}

impl_typed_id!(RestaurantId, "RestaurantId");
impl_typed_id!(BlockId, "BlockId");
impl_typed_id!(GestureId, "GestureId");

// ── Remote entity ids ───────────────────────────────────────────────────────

/// Prefix marking a client-minted placeholder id for an optimistic create.
pub const TEMP_ID_PREFIX: &str = "tmp-";

/// Server-owned identifier of a remote entity (event, location).
///
/// Opaque to the client. Also serves as the correlation key for in-flight
/// optimistic mutations.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap a server-assigned id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a placeholder id for an entity the server has not created yet.
    pub fn temporary() -> Self {
        Self(format!("{TEMP_ID_PREFIX}{}", uuid::Uuid::now_v7().as_simple()))
    }

    /// Whether this id was minted client-side by [`EntityId::temporary`].
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}
