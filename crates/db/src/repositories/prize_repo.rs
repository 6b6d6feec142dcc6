//! Repository for the `prizes` table.

use sqlx::PgPool;
use starquest_core::types::EntityId;

use crate::models::prize::{CreatePrize, DeletePrizeOutcome, Prize, UpdatePrize};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, stars_cost, image_url, available, created_at";

/// Provides CRUD operations for prizes.
pub struct PrizeRepo;

impl PrizeRepo {
    /// Insert a new prize, returning the created row.
    pub async fn create(
        pool: &PgPool,
        id: EntityId,
        input: &CreatePrize,
    ) -> Result<Prize, sqlx::Error> {
        let query = format!(
            "INSERT INTO prizes (id, name, description, stars_cost, image_url, available)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prize>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.stars_cost)
            .bind(&input.image_url)
            .bind(input.available)
            .fetch_one(pool)
            .await
    }

    /// Find a prize by ID.
    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Prize>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prizes WHERE id = $1");
        sqlx::query_as::<_, Prize>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List prizes, cheapest first. Unavailable prizes are hidden unless
    /// `include_unavailable` is set.
    pub async fn list(pool: &PgPool, include_unavailable: bool) -> Result<Vec<Prize>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prizes
             WHERE $1 OR available
             ORDER BY stars_cost ASC, name ASC"
        );
        sqlx::query_as::<_, Prize>(&query)
            .bind(include_unavailable)
            .fetch_all(pool)
            .await
    }

    /// Update a prize. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: EntityId,
        input: &UpdatePrize,
    ) -> Result<Option<Prize>, sqlx::Error> {
        let query = format!(
            "UPDATE prizes SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                stars_cost = COALESCE($4, stars_cost),
                image_url = COALESCE($5, image_url),
                available = COALESCE($6, available)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prize>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.stars_cost)
            .bind(&input.image_url)
            .bind(input.available)
            .fetch_optional(pool)
            .await
    }

    /// Delete a prize unless redemptions still reference it.
    ///
    /// The prize row is locked before counting so a redemption cannot slip
    /// in between the count and the delete.
    pub async fn delete_guarded(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<DeletePrizeOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(EntityId,)> =
            sqlx::query_as("SELECT id FROM prizes WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(DeletePrizeOutcome::NotFound);
        }

        let (redemptions,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM prize_redemptions WHERE prize_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if redemptions > 0 {
            tx.rollback().await?;
            return Ok(DeletePrizeOutcome::Referenced { redemptions });
        }

        sqlx::query("DELETE FROM prizes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(DeletePrizeOutcome::Deleted)
    }
}
