//! Seeker entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use starquest_core::types::{EntityId, Stars, Timestamp};

/// A row from the `seekers` table.
///
/// `stars` is the balance floored at zero, read from the cache. Handlers
/// that show a single seeker recompute it from the ledger.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Seeker {
    pub id: EntityId,
    pub name: String,
    #[serde(skip_serializing)]
    pub pin_hash: String,
    pub avatar_url: Option<String>,
    pub stars: Stars,
    pub created_at: Timestamp,
}

/// DTO for inserting a seeker. The PIN arrives already hashed.
#[derive(Debug, Clone)]
pub struct CreateSeeker {
    pub id: EntityId,
    pub name: String,
    pub pin_hash: String,
    pub avatar_url: Option<String>,
}

/// DTO for updating a seeker. Only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateSeeker {
    pub name: Option<String>,
    pub pin_hash: Option<String>,
    pub avatar_url: Option<String>,
}

/// Request body for `POST /api/seekers`.
///
/// Stars are never accepted from clients; a new seeker starts at zero.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSeekerRequest {
    pub id: Option<EntityId>,
    pub name: String,
    pub pin: String,
    #[serde(alias = "avatarUrl")]
    pub avatar_url: Option<String>,
}

/// Request body for `PUT /api/seekers/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSeekerRequest {
    pub name: Option<String>,
    pub pin: Option<String>,
    #[serde(alias = "avatarUrl")]
    pub avatar_url: Option<String>,
}

/// Request body for `POST /api/seekers/identify`.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentifySeekerRequest {
    pub pin: String,
}
