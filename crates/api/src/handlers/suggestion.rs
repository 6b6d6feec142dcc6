//! Handlers for the `/quest-suggestions` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use starquest_core::error::CoreError;
use starquest_core::ledger::validate_star_amount;
use starquest_core::suggestion::explain_not_pending;
use starquest_core::types::EntityId;
use starquest_core::validation::{parse_optional_timestamp, validate_required_text};
use starquest_db::models::suggestion::{
    CreateSuggestion, CreateSuggestionRequest, QuestSuggestion, SuggestionApproval,
    SuggestionOutcome, UpdateSuggestion,
};
use starquest_db::repositories::{SeekerRepo, SuggestionRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/quest-suggestions
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSuggestionRequest>,
) -> AppResult<(StatusCode, Json<QuestSuggestion>)> {
    validate_required_text("title", &input.title)?;
    validate_required_text("duration", &input.duration)?;
    validate_star_amount("desired_reward", input.desired_reward)?;
    let created_at = parse_optional_timestamp("created_at", input.created_at.as_deref())?
        .unwrap_or_else(Utc::now);

    if !SeekerRepo::exists(&state.pool, input.suggested_by).await? {
        return Err(AppError::Core(CoreError::not_found(
            "Seeker",
            input.suggested_by,
        )));
    }

    let create = CreateSuggestion {
        id: input.id.unwrap_or_else(EntityId::new_v4),
        title: input.title,
        description: input.description,
        suggested_by: input.suggested_by,
        desired_reward: input.desired_reward,
        duration: input.duration,
        created_at,
    };
    let suggestion = SuggestionRepo::create(&state.pool, &create).await?;

    tracing::info!(
        suggestion_id = %suggestion.id,
        seeker_id = %suggestion.suggested_by,
        "Quest suggestion submitted",
    );
    Ok((StatusCode::CREATED, Json(suggestion)))
}

/// GET /api/quest-suggestions
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<QuestSuggestion>>> {
    let suggestions = SuggestionRepo::list(&state.pool).await?;
    Ok(Json(suggestions))
}

/// PUT /api/quest-suggestions/{id}
///
/// Only pending suggestions can be edited.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateSuggestion>,
) -> AppResult<Json<QuestSuggestion>> {
    if input.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "No fields to update".into(),
        )));
    }
    if let Some(title) = &input.title {
        validate_required_text("title", title)?;
    }
    if let Some(reward) = input.desired_reward {
        validate_star_amount("desired_reward", reward)?;
    }

    let suggestion = decided(&state, id, SuggestionRepo::update(&state.pool, id, &input).await?)
        .await?;
    Ok(Json(suggestion))
}

/// POST /api/quest-suggestions/{id}/approve
///
/// Marks the suggestion approved and creates the quest it describes,
/// assigned to the suggester.
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<(StatusCode, Json<SuggestionApproval>)> {
    let outcome = SuggestionRepo::approve(&state.pool, id, EntityId::new_v4()).await?;
    let approval = decided(&state, id, outcome).await?;

    tracing::info!(
        suggestion_id = %id,
        quest_id = %approval.quest.id,
        reward = approval.quest.reward,
        "Quest suggestion approved",
    );
    Ok((StatusCode::CREATED, Json(approval)))
}

/// POST /api/quest-suggestions/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<QuestSuggestion>> {
    let outcome = SuggestionRepo::reject(&state.pool, id).await?;
    let suggestion = decided(&state, id, outcome).await?;

    tracing::info!(suggestion_id = %id, "Quest suggestion rejected");
    Ok(Json(suggestion))
}

/// Unwrap a guarded suggestion change, explaining a miss as 404 or 409.
async fn decided<T>(
    state: &AppState,
    id: EntityId,
    outcome: SuggestionOutcome<T>,
) -> AppResult<T> {
    match outcome {
        SuggestionOutcome::Decided(value) => Ok(value),
        SuggestionOutcome::NotPending => {
            let current = SuggestionRepo::status_of(&state.pool, id).await?;
            Err(explain_not_pending(id, current).into())
        }
    }
}
