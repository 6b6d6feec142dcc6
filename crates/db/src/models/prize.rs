//! Prize entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use starquest_core::types::{EntityId, Stars, Timestamp};

/// A row from the `prizes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prize {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub stars_cost: Stars,
    pub image_url: Option<String>,
    pub available: bool,
    pub created_at: Timestamp,
}

/// Request body / DTO for creating a prize.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrize {
    pub id: Option<EntityId>,
    pub name: String,
    pub description: Option<String>,
    #[serde(alias = "starsCost")]
    pub stars_cost: Stars,
    #[serde(alias = "imageUrl")]
    pub image_url: Option<String>,
    /// Defaults to `true`.
    pub available: Option<bool>,
}

/// Request body / DTO for updating a prize. Only `Some` fields are applied.
///
/// Changing `stars_cost` never touches past redemptions; they keep the cost
/// captured when they were made.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePrize {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "starsCost")]
    pub stars_cost: Option<Stars>,
    #[serde(alias = "imageUrl")]
    pub image_url: Option<String>,
    pub available: Option<bool>,
}

/// Outcome of the guarded prize delete.
#[derive(Debug, PartialEq, Eq)]
pub enum DeletePrizeOutcome {
    Deleted,
    NotFound,
    /// Redemptions still reference the prize; nothing was deleted.
    Referenced { redemptions: i64 },
}
