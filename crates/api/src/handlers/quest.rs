//! Handlers for the `/quests` resource and the quest lifecycle.
//!
//! Start, complete, and reject are single guarded updates; approve credits
//! the reward in the same transaction. When a guard matches nothing the
//! quest is re-read and [`explain_no_match`] decides between 404 and 409.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use starquest_core::error::CoreError;
use starquest_core::ledger::validate_star_amount;
use starquest_core::quest_lifecycle::{explain_no_match, GuardedAction, QuestAction};
use starquest_core::types::EntityId;
use starquest_core::validation::{parse_optional_timestamp, validate_required_text};
use starquest_db::models::quest::{
    ApproveOutcome, CreateQuest, Quest, QuestApproved, QuestCompleted, QuestHistoryEntry,
    QuestRejected, QuestStarted, SeekerActionRequest, TransitionOutcome, UpdateQuest,
    UpdateQuestRequest,
};
use starquest_db::repositories::{QuestRepo, SeekerRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/quests
///
/// New quests always start `active`.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateQuest>,
) -> AppResult<(StatusCode, Json<Quest>)> {
    validate_required_text("title", &input.title)?;
    validate_required_text("duration", &input.duration)?;
    validate_star_amount("reward", input.reward)?;
    ensure_seeker(&state, input.assigned_to).await?;

    let id = input.id.unwrap_or_else(EntityId::new_v4);
    let quest = QuestRepo::create(&state.pool, id, &input).await?;

    tracing::info!(
        quest_id = %quest.id,
        seeker_id = %input.assigned_to,
        reward = quest.reward,
        "Quest created",
    );
    Ok((StatusCode::CREATED, Json(quest)))
}

/// GET /api/quests
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Quest>>> {
    let quests = QuestRepo::list(&state.pool).await?;
    Ok(Json(quests))
}

/// GET /api/quests/history
pub async fn history(State(state): State<AppState>) -> AppResult<Json<Vec<QuestHistoryEntry>>> {
    let entries = QuestRepo::history(&state.pool).await?;
    Ok(Json(entries))
}

/// GET /api/quests/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<Quest>> {
    let quest = QuestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Quest", id)))?;
    Ok(Json(quest))
}

/// PUT /api/quests/{id}
///
/// Every timestamp is parsed before anything is written; a malformed one
/// fails the whole update.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateQuestRequest>,
) -> AppResult<Json<Quest>> {
    let patch = parse_patch(input)?;
    if patch.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "No fields to update".into(),
        )));
    }
    if let Some(seeker_id) = patch.assigned_to {
        ensure_seeker(&state, seeker_id).await?;
    }

    let quest = QuestRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Quest", id)))?;

    tracing::info!(quest_id = %id, status = %quest.status, "Quest updated");
    Ok(Json(quest))
}

/// DELETE /api/quests/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    if QuestRepo::delete(&state.pool, id).await? {
        tracing::info!(quest_id = %id, "Quest deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::not_found("Quest", id)))
    }
}

/// POST /api/quests/{id}/assign
///
/// Hand the quest to another seeker. If it is already completed, its
/// reward moves between the two ledgers in the same transaction.
pub async fn assign(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<SeekerActionRequest>,
) -> AppResult<Json<Quest>> {
    ensure_seeker(&state, input.seeker_id).await?;

    let patch = UpdateQuest {
        assigned_to: Some(input.seeker_id),
        ..Default::default()
    };
    let quest = QuestRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Quest", id)))?;

    tracing::info!(quest_id = %id, seeker_id = %input.seeker_id, "Quest assigned");
    Ok(Json(quest))
}

/// POST /api/quests/{id}/start
pub async fn start(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<SeekerActionRequest>,
) -> AppResult<Json<QuestStarted>> {
    let quest = apply(&state, id, Some(input.seeker_id), GuardedAction::Start).await?;

    tracing::info!(quest_id = %id, seeker_id = %input.seeker_id, "Quest started");
    Ok(Json(QuestStarted {
        status: quest.status,
        started_at: quest.started_at,
    }))
}

/// POST /api/quests/{id}/complete
///
/// Marks the quest as waiting for approval. No stars move yet.
pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<SeekerActionRequest>,
) -> AppResult<Json<QuestCompleted>> {
    let quest = apply(&state, id, Some(input.seeker_id), GuardedAction::Complete).await?;

    tracing::info!(quest_id = %id, seeker_id = %input.seeker_id, "Quest submitted for approval");
    Ok(Json(QuestCompleted {
        status: quest.status,
        completed_at: quest.completed_at,
    }))
}

/// POST /api/quests/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<SeekerActionRequest>,
) -> AppResult<Json<QuestApproved>> {
    let seeker_id = input.seeker_id;
    let quest = match QuestRepo::approve(&state.pool, id, seeker_id).await? {
        ApproveOutcome::Approved(quest) => quest,
        ApproveOutcome::SeekerNotFound => {
            return Err(AppError::Core(CoreError::not_found("Seeker", seeker_id)))
        }
        ApproveOutcome::NoMatch => {
            let current = QuestRepo::guard_state(&state.pool, id).await?;
            return Err(explain_no_match(QuestAction::Approve, id, Some(seeker_id), current).into());
        }
    };

    tracing::info!(
        quest_id = %id,
        seeker_id = %seeker_id,
        reward = quest.reward,
        "Quest approved, stars credited",
    );
    Ok(Json(QuestApproved {
        status: quest.status,
        completed_at: quest.completed_at,
        reward: quest.reward,
    }))
}

/// POST /api/quests/{id}/reject
///
/// Send a pending quest back to `in_progress`. Rejecting an in-progress
/// quest leaves it as it is; a completed quest cannot be rejected.
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<QuestRejected>> {
    let quest = apply(&state, id, None, GuardedAction::Reject).await?;

    tracing::info!(quest_id = %id, "Quest rejected, back in progress");
    Ok(Json(QuestRejected {
        status: quest.status,
        message: "Quest sent back to in progress",
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run a guarded start/complete/reject and turn a guard miss into an error.
async fn apply(
    state: &AppState,
    id: EntityId,
    seeker_id: Option<EntityId>,
    guarded: GuardedAction,
) -> AppResult<Quest> {
    match QuestRepo::transition(&state.pool, id, seeker_id, guarded).await? {
        TransitionOutcome::Applied(quest) => Ok(quest),
        TransitionOutcome::NoMatch => {
            let action = QuestAction::from(guarded);
            let current = QuestRepo::guard_state(&state.pool, id).await?;
            tracing::debug!(quest_id = %id, action = action.verb(), ?current, "Transition guard missed");
            Err(explain_no_match(action, id, seeker_id, current).into())
        }
    }
}

async fn ensure_seeker(state: &AppState, id: EntityId) -> AppResult<()> {
    if SeekerRepo::exists(&state.pool, id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::not_found("Seeker", id)))
    }
}

fn parse_patch(input: UpdateQuestRequest) -> Result<UpdateQuest, CoreError> {
    if let Some(title) = &input.title {
        validate_required_text("title", title)?;
    }
    if let Some(reward) = input.reward {
        validate_star_amount("reward", reward)?;
    }
    let started_at = parse_optional_timestamp("started_at", input.started_at.as_deref())?;
    let completed_at = parse_optional_timestamp("completed_at", input.completed_at.as_deref())?;

    Ok(UpdateQuest {
        title: input.title,
        description: input.description,
        reward: input.reward,
        status: input.status,
        duration: input.duration,
        assigned_to: input.assigned_to,
        started_at,
        completed_at,
    })
}
