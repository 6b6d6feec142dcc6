//! Star ledger: balance reads, the guarded redemption debit, and cache
//! resynchronisation.
//!
//! The ledger proper is `quests` (completed rewards) plus
//! `prize_redemptions` (costs). `seekers.stars` caches earned minus spent
//! exactly, without any floor, so a debit can be guarded by a single
//! conditional `UPDATE`; two concurrent redemptions for the same seeker
//! serialise on that row and the second one re-evaluates `stars >= cost`
//! against the first one's result. The zero floor is applied only when a
//! balance is shown.

use sqlx::{PgPool, Postgres, Transaction};
use starquest_core::quest_lifecycle::QuestStatus;
use starquest_core::types::{EntityId, Stars};

use crate::models::ledger::{RedeemOutcome, SeekerBalance};
use crate::models::redemption::{NewRedemption, PrizeRedemption};

/// Column list for `prize_redemptions` queries.
const REDEMPTION_COLUMNS: &str =
    "id, prize_id, seeker_id, stars_cost, redeemed_at, certificate_id";

/// Earned, spent, and cached balance for the seeker bound to `$1`.
///
/// `SUM(bigint)` is `numeric` in PostgreSQL, hence the casts.
const BALANCE_QUERY: &str = "SELECT
        s.id AS seeker_id,
        COALESCE((
            SELECT SUM(q.reward) FROM quests q
            WHERE q.assigned_to = s.id AND q.status = $2
        ), 0)::BIGINT AS earned,
        COALESCE((
            SELECT SUM(r.stars_cost) FROM prize_redemptions r
            WHERE r.seeker_id = s.id
        ), 0)::BIGINT AS spent,
        s.stars AS cached
     FROM seekers s
     WHERE s.id = $1";

/// Star ledger operations.
pub struct LedgerRepo;

impl LedgerRepo {
    /// Read a seeker's balance. Returns `None` if the seeker does not exist.
    ///
    /// A seeker with no completed quests and no redemptions reads as zero.
    pub async fn balance(
        pool: &PgPool,
        seeker_id: EntityId,
    ) -> Result<Option<SeekerBalance>, sqlx::Error> {
        sqlx::query_as::<_, SeekerBalance>(BALANCE_QUERY)
            .bind(seeker_id)
            .bind(QuestStatus::Completed.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Redeem: guarded debit plus ledger row, in one transaction.
    ///
    /// The debit is `stars = stars - cost WHERE stars >= cost`; if it matches
    /// no row nothing is written. If the insert fails after a successful
    /// debit, the transaction is dropped and the debit rolls back with it.
    pub async fn redeem(
        pool: &PgPool,
        input: &NewRedemption,
    ) -> Result<RedeemOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let debit = sqlx::query(
            "UPDATE seekers SET stars = stars - $2
             WHERE id = $1 AND stars >= $2",
        )
        .bind(input.seeker_id)
        .bind(input.stars_cost)
        .execute(&mut *tx)
        .await?;

        if debit.rows_affected() == 0 {
            let current: Option<(Stars,)> = sqlx::query_as("SELECT stars FROM seekers WHERE id = $1")
                .bind(input.seeker_id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;
            return Ok(match current {
                None => RedeemOutcome::SeekerNotFound,
                Some((available,)) => RedeemOutcome::InsufficientBalance { available },
            });
        }

        let query = format!(
            "INSERT INTO prize_redemptions
                (id, prize_id, seeker_id, stars_cost, redeemed_at, certificate_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {REDEMPTION_COLUMNS}"
        );
        let redemption = sqlx::query_as::<_, PrizeRedemption>(&query)
            .bind(input.id)
            .bind(input.prize_id)
            .bind(input.seeker_id)
            .bind(input.stars_cost)
            .bind(input.redeemed_at)
            .bind(&input.certificate_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(RedeemOutcome::Redeemed(redemption))
    }

    /// Recompute the cached balance from the ledger and return the new value,
    /// which is negative when more was spent than the ledger now credits.
    ///
    /// Returns `None` if the seeker does not exist.
    pub async fn resync(pool: &PgPool, seeker_id: EntityId) -> Result<Option<Stars>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let stars = Self::resync_in_tx(&mut tx, seeker_id).await?;
        tx.commit().await?;
        Ok(stars)
    }

    // -----------------------------------------------------------------------
    // Transaction-scoped helpers (used by the quest lifecycle)
    // -----------------------------------------------------------------------

    /// Credit `amount` stars inside an open transaction.
    ///
    /// Returns `false` if the seeker row does not exist.
    pub async fn credit_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        seeker_id: EntityId,
        amount: Stars,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE seekers SET stars = stars + $2 WHERE id = $1")
            .bind(seeker_id)
            .bind(amount)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Recompute the cached balance inside an open transaction.
    ///
    /// The seeker row is locked first, in its own statement, so the
    /// recomputation runs on a snapshot that already includes every
    /// redemption committed before the lock was granted.
    pub async fn resync_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        seeker_id: EntityId,
    ) -> Result<Option<Stars>, sqlx::Error> {
        let locked: Option<(EntityId,)> =
            sqlx::query_as("SELECT id FROM seekers WHERE id = $1 FOR UPDATE")
                .bind(seeker_id)
                .fetch_optional(&mut **tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let (stars,): (Stars,) = sqlx::query_as(
            "UPDATE seekers s SET stars = (
                COALESCE((
                    SELECT SUM(q.reward) FROM quests q
                    WHERE q.assigned_to = s.id AND q.status = $2
                ), 0)
                - COALESCE((
                    SELECT SUM(r.stars_cost) FROM prize_redemptions r
                    WHERE r.seeker_id = s.id
                ), 0))::BIGINT
             WHERE s.id = $1
             RETURNING s.stars",
        )
        .bind(seeker_id)
        .bind(QuestStatus::Completed.as_str())
        .fetch_one(&mut **tx)
        .await?;

        tracing::debug!(seeker_id = %seeker_id, stars, "Resynced cached star balance");
        Ok(Some(stars))
    }
}
