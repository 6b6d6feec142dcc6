//! Quest suggestion model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use starquest_core::suggestion::SuggestionStatus;
use starquest_core::types::{EntityId, Stars, Timestamp};

use crate::models::quest::Quest;

/// A row from the `quest_suggestions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestSuggestion {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub suggested_by: EntityId,
    pub desired_reward: Stars,
    pub duration: String,
    #[sqlx(try_from = "String")]
    pub status: SuggestionStatus,
    pub created_at: Timestamp,
}

/// Request body for `POST /api/quest-suggestions`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSuggestionRequest {
    pub id: Option<EntityId>,
    pub title: String,
    pub description: Option<String>,
    #[serde(alias = "suggestedBy")]
    pub suggested_by: EntityId,
    #[serde(alias = "desiredReward")]
    pub desired_reward: Stars,
    pub duration: String,
    /// ISO-8601; defaults to now.
    #[serde(alias = "createdAt")]
    pub created_at: Option<String>,
}

/// Parsed insert DTO.
#[derive(Debug, Clone)]
pub struct CreateSuggestion {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub suggested_by: EntityId,
    pub desired_reward: Stars,
    pub duration: String,
    pub created_at: Timestamp,
}

/// Request body / DTO for `PUT /api/quest-suggestions/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSuggestion {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "desiredReward")]
    pub desired_reward: Option<Stars>,
    pub duration: Option<String>,
}

impl UpdateSuggestion {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.desired_reward.is_none()
            && self.duration.is_none()
    }
}

/// Result of promoting a suggestion.
#[derive(Debug, Serialize)]
pub struct SuggestionApproval {
    pub suggestion: QuestSuggestion,
    pub quest: Quest,
}

/// Outcome of a guarded suggestion decision.
#[derive(Debug)]
pub enum SuggestionOutcome<T> {
    Decided(T),
    /// No pending suggestion with that id; nothing changed.
    NotPending,
}
