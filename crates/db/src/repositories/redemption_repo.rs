//! Read-side queries over the `prize_redemptions` ledger. Writes go through
//! [`crate::repositories::LedgerRepo::redeem`].

use sqlx::PgPool;
use starquest_core::types::EntityId;

use crate::models::redemption::{RedemptionListItem, SeekerRedemption};

/// Read access to prize redemptions.
pub struct RedemptionRepo;

impl RedemptionRepo {
    /// Every redemption with prize and seeker names, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<RedemptionListItem>, sqlx::Error> {
        sqlx::query_as::<_, RedemptionListItem>(
            "SELECT r.id, r.certificate_id, r.redeemed_at, r.stars_cost,
                    p.id AS prize_id, p.name AS prize_name,
                    s.id AS seeker_id, s.name AS seeker_name
             FROM prize_redemptions r
             JOIN prizes p ON p.id = r.prize_id
             JOIN seekers s ON s.id = r.seeker_id
             ORDER BY r.redeemed_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// A seeker's redemptions with prize names, newest first.
    pub async fn list_for_seeker(
        pool: &PgPool,
        seeker_id: EntityId,
    ) -> Result<Vec<SeekerRedemption>, sqlx::Error> {
        sqlx::query_as::<_, SeekerRedemption>(
            "SELECT r.id, r.certificate_id, r.redeemed_at, r.stars_cost,
                    p.id AS prize_id, p.name AS prize_name
             FROM prize_redemptions r
             JOIN prizes p ON p.id = r.prize_id
             WHERE r.seeker_id = $1
             ORDER BY r.redeemed_at DESC",
        )
        .bind(seeker_id)
        .fetch_all(pool)
        .await
    }
}
