//! Handlers for the `/seekers` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use starquest_core::error::CoreError;
use starquest_core::ledger::spendable;
use starquest_core::types::{EntityId, Stars};
use starquest_core::validation::{validate_pin, validate_required_text};
use starquest_db::models::quest::Quest;
use starquest_db::models::redemption::SeekerRedemption;
use starquest_db::models::seeker::{
    CreateSeeker, CreateSeekerRequest, IdentifySeekerRequest, Seeker, UpdateSeeker,
    UpdateSeekerRequest,
};
use starquest_db::repositories::{LedgerRepo, QuestRepo, RedemptionRepo, SeekerRepo};

use crate::auth::pin::{hash_pin, verify_pin};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response for `POST /api/seekers/{id}/reconcile`.
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub seeker_id: EntityId,
    pub stars: Stars,
}

/// POST /api/seekers
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSeekerRequest>,
) -> AppResult<(StatusCode, Json<Seeker>)> {
    validate_required_text("name", &input.name)?;
    validate_pin(&input.pin)?;

    let create = CreateSeeker {
        id: input.id.unwrap_or_else(EntityId::new_v4),
        name: input.name.trim().to_string(),
        pin_hash: hash(&input.pin)?,
        avatar_url: input.avatar_url,
    };
    let seeker = SeekerRepo::create(&state.pool, &create).await?;

    tracing::info!(seeker_id = %seeker.id, "Seeker created");
    Ok((StatusCode::CREATED, Json(seeker)))
}

/// GET /api/seekers
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Seeker>>> {
    let seekers = SeekerRepo::list(&state.pool).await?;
    Ok(Json(seekers))
}

/// GET /api/seekers/{id}
///
/// `stars` is the ledger-derived balance floored at zero, not the cached
/// counter.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<Seeker>> {
    let seeker = SeekerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Seeker", id)))?;
    Ok(Json(with_derived_balance(&state, seeker).await?))
}

/// PUT /api/seekers/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateSeekerRequest>,
) -> AppResult<Json<Seeker>> {
    if let Some(name) = &input.name {
        validate_required_text("name", name)?;
    }
    let pin_hash = match &input.pin {
        Some(pin) => {
            validate_pin(pin)?;
            Some(hash(pin)?)
        }
        None => None,
    };

    let patch = UpdateSeeker {
        name: input.name.map(|n| n.trim().to_string()),
        pin_hash,
        avatar_url: input.avatar_url,
    };
    if patch.name.is_none() && patch.pin_hash.is_none() && patch.avatar_url.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "No fields to update".into(),
        )));
    }

    let seeker = SeekerRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Seeker", id)))?;
    Ok(Json(seeker))
}

/// DELETE /api/seekers/{id}
///
/// Removes the seeker's suggestions and redemptions with them; their quests
/// stay and become unassigned.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<StatusCode> {
    if SeekerRepo::delete(&state.pool, id).await? {
        tracing::info!(seeker_id = %id, "Seeker deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::not_found("Seeker", id)))
    }
}

/// POST /api/seekers/identify
///
/// Find the seeker whose PIN matches. A household has a handful of seekers,
/// so every stored hash is checked.
pub async fn identify(
    State(state): State<AppState>,
    Json(input): Json<IdentifySeekerRequest>,
) -> AppResult<Json<Seeker>> {
    validate_pin(&input.pin)?;

    for seeker in SeekerRepo::list(&state.pool).await? {
        let matches = match verify_pin(&input.pin, &seeker.pin_hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(seeker_id = %seeker.id, error = %e, "Unreadable PIN hash, skipping seeker");
                continue;
            }
        };
        if matches {
            tracing::info!(seeker_id = %seeker.id, "Seeker identified by PIN");
            return Ok(Json(with_derived_balance(&state, seeker).await?));
        }
    }

    Err(AppError::Core(CoreError::Unauthorized(
        "No seeker matches that PIN".into(),
    )))
}

/// GET /api/seekers/{id}/quests
///
/// The seeker's board: quests that are active, in progress, or awaiting
/// approval.
pub async fn list_quests(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<Vec<Quest>>> {
    ensure_exists(&state, id).await?;
    let quests = QuestRepo::list_open_for_seeker(&state.pool, id).await?;
    Ok(Json(quests))
}

/// GET /api/seekers/{id}/redemptions
pub async fn list_redemptions(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<Vec<SeekerRedemption>>> {
    ensure_exists(&state, id).await?;
    let redemptions = RedemptionRepo::list_for_seeker(&state.pool, id).await?;
    Ok(Json(redemptions))
}

/// POST /api/seekers/{id}/reconcile
///
/// Recompute the cached balance from the ledger. The response shows it
/// floored at zero, like every other balance read.
pub async fn reconcile(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<ReconcileResponse>> {
    let stars = LedgerRepo::resync(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Seeker", id)))?;

    tracing::info!(seeker_id = %id, stars, "Seeker balance reconciled");
    Ok(Json(ReconcileResponse {
        seeker_id: id,
        stars: spendable(stars),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hash(pin: &str) -> AppResult<String> {
    hash_pin(pin).map_err(|e| AppError::InternalError(format!("PIN hashing error: {e}")))
}

async fn ensure_exists(state: &AppState, id: EntityId) -> AppResult<()> {
    if SeekerRepo::exists(&state.pool, id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::not_found("Seeker", id)))
    }
}

/// Replace the cached `stars` with the ledger-derived balance floored at
/// zero, warning if the cache disagrees with the ledger.
async fn with_derived_balance(state: &AppState, mut seeker: Seeker) -> AppResult<Seeker> {
    let balance = LedgerRepo::balance(&state.pool, seeker.id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Seeker", seeker.id)))?;

    if balance.has_drift() {
        tracing::warn!(
            seeker_id = %seeker.id,
            earned = balance.earned,
            spent = balance.spent,
            cached = balance.cached,
            "Cached star balance disagrees with the ledger",
        );
    }

    seeker.stars = balance.spendable();
    Ok(seeker)
}
