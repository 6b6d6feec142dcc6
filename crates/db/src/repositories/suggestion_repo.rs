//! Repository for the `quest_suggestions` table.

use sqlx::PgPool;
use starquest_core::quest_lifecycle::QuestStatus;
use starquest_core::suggestion::SuggestionStatus;
use starquest_core::types::EntityId;

use crate::models::quest::Quest;
use crate::models::suggestion::{
    CreateSuggestion, QuestSuggestion, SuggestionApproval, SuggestionOutcome, UpdateSuggestion,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, title, description, suggested_by, desired_reward, duration, status, created_at";

/// Column list for the quest created on approval.
const QUEST_COLUMNS: &str = "id, title, description, reward, status, duration, assigned_to, \
    started_at, completed_at, created_at";

/// Provides CRUD and decision operations for quest suggestions.
pub struct SuggestionRepo;

impl SuggestionRepo {
    /// Insert a new `pending` suggestion, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSuggestion,
    ) -> Result<QuestSuggestion, sqlx::Error> {
        let query = format!(
            "INSERT INTO quest_suggestions
                (id, title, description, suggested_by, desired_reward, duration, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuestSuggestion>(&query)
            .bind(input.id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.suggested_by)
            .bind(input.desired_reward)
            .bind(&input.duration)
            .bind(SuggestionStatus::Pending.as_str())
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// Find a suggestion by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<QuestSuggestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quest_suggestions WHERE id = $1");
        sqlx::query_as::<_, QuestSuggestion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Current status of a suggestion, used to explain a guard miss.
    pub async fn status_of(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<SuggestionStatus>, sqlx::Error> {
        Ok(Self::find_by_id(pool, id).await?.map(|s| s.status))
    }

    /// List all suggestions, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<QuestSuggestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quest_suggestions ORDER BY created_at DESC");
        sqlx::query_as::<_, QuestSuggestion>(&query)
            .fetch_all(pool)
            .await
    }

    /// Edit a suggestion while it is still pending.
    pub async fn update(
        pool: &PgPool,
        id: EntityId,
        input: &UpdateSuggestion,
    ) -> Result<SuggestionOutcome<QuestSuggestion>, sqlx::Error> {
        let query = format!(
            "UPDATE quest_suggestions SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                desired_reward = COALESCE($4, desired_reward),
                duration = COALESCE($5, duration)
             WHERE id = $1 AND status = $6
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, QuestSuggestion>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.desired_reward)
            .bind(&input.duration)
            .bind(SuggestionStatus::Pending.as_str())
            .fetch_optional(pool)
            .await?;

        Ok(match updated {
            Some(s) => SuggestionOutcome::Decided(s),
            None => SuggestionOutcome::NotPending,
        })
    }

    /// Approve a pending suggestion and create the matching `active` quest,
    /// assigned to the suggester, in one transaction.
    pub async fn approve(
        pool: &PgPool,
        id: EntityId,
        quest_id: EntityId,
    ) -> Result<SuggestionOutcome<SuggestionApproval>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let decide = format!(
            "UPDATE quest_suggestions SET status = $2
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        let Some(suggestion) = sqlx::query_as::<_, QuestSuggestion>(&decide)
            .bind(id)
            .bind(SuggestionStatus::Approved.as_str())
            .bind(SuggestionStatus::Pending.as_str())
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(SuggestionOutcome::NotPending);
        };

        let insert = format!(
            "INSERT INTO quests (id, title, description, reward, status, duration, assigned_to)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {QUEST_COLUMNS}"
        );
        let quest = sqlx::query_as::<_, Quest>(&insert)
            .bind(quest_id)
            .bind(&suggestion.title)
            .bind(&suggestion.description)
            .bind(suggestion.desired_reward)
            .bind(QuestStatus::Active.as_str())
            .bind(&suggestion.duration)
            .bind(suggestion.suggested_by)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(SuggestionOutcome::Decided(SuggestionApproval { suggestion, quest }))
    }

    /// Reject a pending suggestion.
    pub async fn reject(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<SuggestionOutcome<QuestSuggestion>, sqlx::Error> {
        let query = format!(
            "UPDATE quest_suggestions SET status = $2
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        let rejected = sqlx::query_as::<_, QuestSuggestion>(&query)
            .bind(id)
            .bind(SuggestionStatus::Rejected.as_str())
            .bind(SuggestionStatus::Pending.as_str())
            .fetch_optional(pool)
            .await?;

        Ok(match rejected {
            Some(s) => SuggestionOutcome::Decided(s),
            None => SuggestionOutcome::NotPending,
        })
    }
}
