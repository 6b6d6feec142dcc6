//! Quest entity model, lifecycle DTOs, and history views.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use starquest_core::quest_lifecycle::{QuestGuardState, QuestStatus};
use starquest_core::types::{EntityId, Stars, Timestamp};

/// A row from the `quests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quest {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub reward: Stars,
    #[sqlx(try_from = "String")]
    pub status: QuestStatus,
    pub duration: String,
    pub assigned_to: Option<EntityId>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Quest {
    pub fn guard_state(&self) -> QuestGuardState {
        QuestGuardState {
            status: self.status,
            assigned_to: self.assigned_to,
        }
    }
}

/// A completed quest joined with its assignee's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestHistoryEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub quest: Quest,
    pub seeker_name: Option<String>,
}

/// DTO / request body for creating a quest. New quests are always `active`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuest {
    pub id: Option<EntityId>,
    pub title: String,
    pub description: Option<String>,
    pub reward: Stars,
    pub duration: String,
    #[serde(alias = "assignedTo")]
    pub assigned_to: EntityId,
}

/// Request body for `PUT /api/quests/{id}`. Timestamps arrive as ISO-8601
/// text and are parsed into [`UpdateQuest`] before anything is written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuestRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reward: Option<Stars>,
    pub status: Option<QuestStatus>,
    pub duration: Option<String>,
    #[serde(alias = "assignedTo")]
    pub assigned_to: Option<EntityId>,
    #[serde(alias = "startedAt")]
    pub started_at: Option<String>,
    #[serde(alias = "completedAt")]
    pub completed_at: Option<String>,
}

/// Parsed quest patch. Only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateQuest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reward: Option<Stars>,
    pub status: Option<QuestStatus>,
    pub duration: Option<String>,
    pub assigned_to: Option<EntityId>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl UpdateQuest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.reward.is_none()
            && self.status.is_none()
            && self.duration.is_none()
            && self.assigned_to.is_none()
            && self.started_at.is_none()
            && self.completed_at.is_none()
    }

    /// Whether applying this patch can move stars between ledgers.
    pub fn touches_ledger(&self) -> bool {
        self.reward.is_some() || self.status.is_some() || self.assigned_to.is_some()
    }
}

/// Request body naming the acting seeker (start, complete, approve, assign).
#[derive(Debug, Clone, Deserialize)]
pub struct SeekerActionRequest {
    #[serde(alias = "seekerId")]
    pub seeker_id: EntityId,
}

/// Outcome of a guarded quest update.
#[derive(Debug)]
pub enum TransitionOutcome {
    Applied(Quest),
    /// The guard matched no row; nothing changed.
    NoMatch,
}

/// Outcome of the approve transaction.
#[derive(Debug)]
pub enum ApproveOutcome {
    Approved(Quest),
    /// The quest was not pending or not assigned to that seeker.
    NoMatch,
    /// The assignee row is gone; the transaction was rolled back.
    SeekerNotFound,
}

/// Response for `POST /api/quests/{id}/start`.
#[derive(Debug, Serialize)]
pub struct QuestStarted {
    pub status: QuestStatus,
    pub started_at: Option<Timestamp>,
}

/// Response for `POST /api/quests/{id}/complete`.
#[derive(Debug, Serialize)]
pub struct QuestCompleted {
    pub status: QuestStatus,
    pub completed_at: Option<Timestamp>,
}

/// Response for `POST /api/quests/{id}/approve`.
#[derive(Debug, Serialize)]
pub struct QuestApproved {
    pub status: QuestStatus,
    pub completed_at: Option<Timestamp>,
    pub reward: Stars,
}

/// Response for `POST /api/quests/{id}/reject`.
#[derive(Debug, Serialize)]
pub struct QuestRejected {
    pub status: QuestStatus,
    pub message: &'static str,
}
