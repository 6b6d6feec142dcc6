//! Handlers for the `/prizes` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use starquest_core::error::CoreError;
use starquest_core::ledger::validate_star_amount;
use starquest_core::types::EntityId;
use starquest_core::validation::validate_required_text;
use starquest_db::models::prize::{CreatePrize, DeletePrizeOutcome, Prize, UpdatePrize};
use starquest_db::repositories::PrizeRepo;

use crate::error::{AppError, AppResult};
use crate::query::IncludeUnavailableParams;
use crate::state::AppState;

/// POST /api/prizes
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePrize>,
) -> AppResult<(StatusCode, Json<Prize>)> {
    validate_required_text("name", &input.name)?;
    validate_star_amount("stars_cost", input.stars_cost)?;

    let id = input.id.unwrap_or_else(EntityId::new_v4);
    let prize = PrizeRepo::create(&state.pool, id, &input).await?;

    tracing::info!(prize_id = %prize.id, stars_cost = prize.stars_cost, "Prize created");
    Ok((StatusCode::CREATED, Json(prize)))
}

/// GET /api/prizes
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<IncludeUnavailableParams>,
) -> AppResult<Json<Vec<Prize>>> {
    let prizes = PrizeRepo::list(&state.pool, params.include_unavailable).await?;
    Ok(Json(prizes))
}

/// GET /api/prizes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<Prize>> {
    let prize = PrizeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Prize", id)))?;
    Ok(Json(prize))
}

/// PUT /api/prizes/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdatePrize>,
) -> AppResult<Json<Prize>> {
    if let Some(name) = &input.name {
        validate_required_text("name", name)?;
    }
    if let Some(cost) = input.stars_cost {
        validate_star_amount("stars_cost", cost)?;
    }

    let prize = PrizeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Prize", id)))?;
    Ok(Json(prize))
}

/// DELETE /api/prizes/{id}
///
/// Refused while any redemption references the prize.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    match PrizeRepo::delete_guarded(&state.pool, id).await? {
        DeletePrizeOutcome::Deleted => {
            tracing::info!(prize_id = %id, "Prize deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        DeletePrizeOutcome::NotFound => Err(AppError::Core(CoreError::not_found("Prize", id))),
        DeletePrizeOutcome::Referenced { redemptions } => {
            Err(AppError::Core(CoreError::Conflict(format!(
                "Prize {id} has {redemptions} redemption(s) and cannot be deleted"
            ))))
        }
    }
}
