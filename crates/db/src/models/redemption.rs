//! Prize redemption ledger entries and listing views.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use starquest_core::types::{EntityId, Stars, Timestamp};

/// A row from the `prize_redemptions` table. Never updated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PrizeRedemption {
    pub id: EntityId,
    pub prize_id: EntityId,
    pub seeker_id: EntityId,
    pub stars_cost: Stars,
    pub redeemed_at: Timestamp,
    pub certificate_id: String,
}

/// Fully resolved redemption, ready for the guarded debit.
#[derive(Debug, Clone)]
pub struct NewRedemption {
    pub id: EntityId,
    pub prize_id: EntityId,
    pub seeker_id: EntityId,
    pub stars_cost: Stars,
    pub redeemed_at: Timestamp,
    pub certificate_id: String,
}

/// Request body for `POST /api/prizes/redeem`.
///
/// `stars_cost` is optional; when given it must equal the prize's current
/// price.
#[derive(Debug, Clone, Deserialize)]
pub struct RedeemRequest {
    #[serde(alias = "prizeId")]
    pub prize_id: EntityId,
    #[serde(alias = "seekerId")]
    pub seeker_id: EntityId,
    #[serde(alias = "starsCost")]
    pub stars_cost: Option<Stars>,
}

/// Request body for `POST /api/prize-redemptions`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRedemptionRequest {
    pub id: Option<EntityId>,
    #[serde(alias = "prizeId")]
    pub prize_id: EntityId,
    #[serde(alias = "seekerId")]
    pub seeker_id: EntityId,
    #[serde(alias = "starsCost")]
    pub stars_cost: Option<Stars>,
    /// ISO-8601; defaults to now.
    #[serde(alias = "redeemedAt")]
    pub redeemed_at: Option<String>,
    #[serde(alias = "certificateId")]
    pub certificate_id: Option<String>,
}

/// Response for `POST /api/prizes/redeem`.
#[derive(Debug, Serialize)]
pub struct Certificate {
    pub certificate_id: String,
}

/// A redemption joined with prize and seeker names (admin listing).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RedemptionListItem {
    pub id: EntityId,
    pub certificate_id: String,
    pub redeemed_at: Timestamp,
    pub stars_cost: Stars,
    pub prize_id: EntityId,
    pub prize_name: String,
    pub seeker_id: EntityId,
    pub seeker_name: String,
}

/// A redemption joined with the prize name (seeker history).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeekerRedemption {
    pub id: EntityId,
    pub certificate_id: String,
    pub redeemed_at: Timestamp,
    pub stars_cost: Stars,
    pub prize_id: EntityId,
    pub prize_name: String,
}
