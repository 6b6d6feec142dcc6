//! Repository for the `seekers` table.

use sqlx::PgPool;
use starquest_core::types::EntityId;

use crate::models::seeker::{CreateSeeker, Seeker, UpdateSeeker};

/// Column list shared across queries to avoid repetition. The cached
/// balance can be negative; seekers are shown it floored at zero.
const COLUMNS: &str = "id, name, pin_hash, avatar_url, GREATEST(stars, 0) AS stars, created_at";

/// Provides CRUD operations for seekers.
///
/// The `stars` column is not writable here; only [`crate::repositories::LedgerRepo`]
/// and the approval transaction touch it.
pub struct SeekerRepo;

impl SeekerRepo {
    /// Insert a new seeker with a zero balance, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSeeker) -> Result<Seeker, sqlx::Error> {
        let query = format!(
            "INSERT INTO seekers (id, name, pin_hash, avatar_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Seeker>(&query)
            .bind(input.id)
            .bind(&input.name)
            .bind(&input.pin_hash)
            .bind(&input.avatar_url)
            .fetch_one(pool)
            .await
    }

    /// Find a seeker by ID.
    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Seeker>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seekers WHERE id = $1");
        sqlx::query_as::<_, Seeker>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a seeker with this ID exists.
    pub async fn exists(pool: &PgPool, id: EntityId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM seekers WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(exists)
    }

    /// List all seekers ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Seeker>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seekers ORDER BY name ASC, created_at ASC");
        sqlx::query_as::<_, Seeker>(&query).fetch_all(pool).await
    }

    /// Update a seeker. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: EntityId,
        input: &UpdateSeeker,
    ) -> Result<Option<Seeker>, sqlx::Error> {
        let query = format!(
            "UPDATE seekers SET
                name = COALESCE($2, name),
                pin_hash = COALESCE($3, pin_hash),
                avatar_url = COALESCE($4, avatar_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Seeker>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.pin_hash)
            .bind(&input.avatar_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a seeker. Their suggestions and redemptions go with them;
    /// quests they held become unassigned. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM seekers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
