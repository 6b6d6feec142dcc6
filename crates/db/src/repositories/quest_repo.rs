//! Repository for the `quests` table and the quest lifecycle transactions.

use sqlx::{PgPool, Postgres, Transaction};
use starquest_core::quest_lifecycle::{GuardedAction, QuestAction, QuestGuardState, QuestStatus};
use starquest_core::types::EntityId;

use crate::models::quest::{
    ApproveOutcome, CreateQuest, Quest, QuestHistoryEntry, TransitionOutcome, UpdateQuest,
};
use crate::repositories::LedgerRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, reward, status, duration, assigned_to, \
    started_at, completed_at, created_at";

/// Provides CRUD and lifecycle operations for quests.
pub struct QuestRepo;

impl QuestRepo {
    /// Insert a new `active` quest, returning the created row.
    pub async fn create(
        pool: &PgPool,
        id: EntityId,
        input: &CreateQuest,
    ) -> Result<Quest, sqlx::Error> {
        let query = format!(
            "INSERT INTO quests (id, title, description, reward, status, duration, assigned_to)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Quest>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.reward)
            .bind(QuestStatus::Active.as_str())
            .bind(&input.duration)
            .bind(input.assigned_to)
            .fetch_one(pool)
            .await
    }

    /// Find a quest by ID.
    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Quest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quests WHERE id = $1");
        sqlx::query_as::<_, Quest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Read just the fields a transition guard looks at.
    pub async fn guard_state(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<QuestGuardState>, sqlx::Error> {
        Ok(Self::find_by_id(pool, id).await?.map(|q| q.guard_state()))
    }

    /// List all quests, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Quest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quests ORDER BY created_at DESC");
        sqlx::query_as::<_, Quest>(&query).fetch_all(pool).await
    }

    /// Quests on a seeker's board: `active`, `in_progress`, or `pending`.
    pub async fn list_open_for_seeker(
        pool: &PgPool,
        seeker_id: EntityId,
    ) -> Result<Vec<Quest>, sqlx::Error> {
        let open: Vec<&str> = QuestStatus::OPEN.iter().map(|s| s.as_str()).collect();
        let query = format!(
            "SELECT {COLUMNS} FROM quests
             WHERE assigned_to = $1 AND status = ANY($2)
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Quest>(&query)
            .bind(seeker_id)
            .bind(open)
            .fetch_all(pool)
            .await
    }

    /// Completed quests joined with the assignee's name, most recent first.
    pub async fn history(pool: &PgPool) -> Result<Vec<QuestHistoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, QuestHistoryEntry>(
            "SELECT q.id, q.title, q.description, q.reward, q.status, q.duration,
                    q.assigned_to, q.started_at, q.completed_at, q.created_at,
                    s.name AS seeker_name
             FROM quests q
             LEFT JOIN seekers s ON s.id = q.assigned_to
             WHERE q.status = $1
             ORDER BY q.completed_at DESC NULLS LAST",
        )
        .bind(QuestStatus::Completed.as_str())
        .fetch_all(pool)
        .await
    }

    /// Apply a start, complete, or reject transition with a single guarded
    /// `UPDATE`.
    ///
    /// The guard checks the current status against
    /// [`QuestAction::allowed_from`] and, for seeker actions, the assignee.
    /// A guard that matches no row yields [`TransitionOutcome::NoMatch`],
    /// never a silent success.
    ///
    /// Approval moves stars and goes through [`QuestRepo::approve`] instead.
    pub async fn transition(
        pool: &PgPool,
        id: EntityId,
        seeker_id: Option<EntityId>,
        guarded: GuardedAction,
    ) -> Result<TransitionOutcome, sqlx::Error> {
        let set_clause = match guarded {
            GuardedAction::Start => "status = $2, started_at = now()",
            GuardedAction::Complete => "status = $2, completed_at = now()",
            GuardedAction::Reject => "status = $2, completed_at = NULL",
        };
        let action = QuestAction::from(guarded);
        let assignee_clause = if action.requires_assignee() {
            "AND assigned_to = $4"
        } else {
            "AND ($4::uuid IS NULL OR assigned_to = $4)"
        };
        let query = format!(
            "UPDATE quests SET {set_clause}
             WHERE id = $1 AND status = ANY($3) {assignee_clause}
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Quest>(&query)
            .bind(id)
            .bind(action.target().as_str())
            .bind(action.allowed_from_str())
            .bind(seeker_id)
            .fetch_optional(pool)
            .await?;

        Ok(match updated {
            Some(quest) => TransitionOutcome::Applied(quest),
            None => TransitionOutcome::NoMatch,
        })
    }

    /// Approve a pending quest and credit its reward, atomically.
    ///
    /// Status change and credit commit together or not at all.
    /// `completed_at` keeps the time the seeker asked for approval, or is
    /// set now if it was never recorded.
    pub async fn approve(
        pool: &PgPool,
        id: EntityId,
        seeker_id: EntityId,
    ) -> Result<ApproveOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE quests SET status = $2, completed_at = COALESCE(completed_at, now())
             WHERE id = $1 AND status = ANY($3) AND assigned_to = $4
             RETURNING {COLUMNS}"
        );
        let approved = sqlx::query_as::<_, Quest>(&query)
            .bind(id)
            .bind(QuestAction::Approve.target().as_str())
            .bind(QuestAction::Approve.allowed_from_str())
            .bind(seeker_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(quest) = approved else {
            tx.rollback().await?;
            return Ok(ApproveOutcome::NoMatch);
        };

        if !LedgerRepo::credit_in_tx(&mut tx, seeker_id, quest.reward).await? {
            tx.rollback().await?;
            return Ok(ApproveOutcome::SeekerNotFound);
        }

        tx.commit().await?;
        Ok(ApproveOutcome::Approved(quest))
    }

    /// Patch a quest. Only non-`None` fields in `input` are applied.
    ///
    /// When the patch changes who holds a completed reward (status, reward,
    /// or assignee of a quest that is or becomes `completed`), the affected
    /// seekers' cached balances are recomputed in the same transaction.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: EntityId,
        input: &UpdateQuest,
    ) -> Result<Option<Quest>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let before_query = format!("SELECT {COLUMNS} FROM quests WHERE id = $1 FOR UPDATE");
        let Some(before) = sqlx::query_as::<_, Quest>(&before_query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let query = format!(
            "UPDATE quests SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                reward = COALESCE($4, reward),
                status = COALESCE($5, status),
                duration = COALESCE($6, duration),
                assigned_to = COALESCE($7, assigned_to),
                started_at = COALESCE($8, started_at),
                completed_at = COALESCE($9, completed_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let after = sqlx::query_as::<_, Quest>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.reward)
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.duration)
            .bind(input.assigned_to)
            .bind(input.started_at)
            .bind(input.completed_at)
            .fetch_one(&mut *tx)
            .await?;

        if input.touches_ledger() {
            Self::resync_affected(&mut tx, &before, &after).await?;
        }

        tx.commit().await?;
        Ok(Some(after))
    }

    /// Hard-delete a quest. Returns `true` if a row was deleted.
    ///
    /// Deleting a completed quest removes its reward from the assignee's
    /// ledger; the cached balance is recomputed in the same transaction.
    pub async fn delete(pool: &PgPool, id: EntityId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("DELETE FROM quests WHERE id = $1 RETURNING {COLUMNS}");
        let deleted = sqlx::query_as::<_, Quest>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(quest) = deleted else {
            tx.rollback().await?;
            return Ok(false);
        };

        if quest.status.is_rewarded() {
            if let Some(seeker_id) = quest.assigned_to {
                LedgerRepo::resync_in_tx(&mut tx, seeker_id).await?;
            }
        }

        tx.commit().await?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Recompute cached balances of every seeker whose completed rewards
    /// may differ between `before` and `after`.
    async fn resync_affected(
        tx: &mut Transaction<'_, Postgres>,
        before: &Quest,
        after: &Quest,
    ) -> Result<(), sqlx::Error> {
        let rewarded_before = before.status.is_rewarded();
        let rewarded_after = after.status.is_rewarded();
        if !rewarded_before && !rewarded_after {
            return Ok(());
        }
        let unchanged = rewarded_before == rewarded_after
            && before.reward == after.reward
            && before.assigned_to == after.assigned_to;
        if unchanged {
            return Ok(());
        }

        // Lock seekers in a stable order to avoid deadlocks between
        // concurrent reassignments.
        let mut seekers: Vec<EntityId> = [before.assigned_to, after.assigned_to]
            .into_iter()
            .flatten()
            .collect();
        seekers.sort();
        seekers.dedup();

        for seeker_id in seekers {
            LedgerRepo::resync_in_tx(tx, seeker_id).await?;
        }
        Ok(())
    }
}
