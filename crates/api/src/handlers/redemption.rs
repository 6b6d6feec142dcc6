//! Redeeming prizes and listing redemptions.
//!
//! Both `POST /api/prizes/redeem` and `POST /api/prize-redemptions` go
//! through [`LedgerRepo::redeem`]: the debit and the ledger row are written
//! together, and the debit only applies while the balance covers the cost.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use starquest_core::error::CoreError;
use starquest_core::ledger::{
    ensure_sufficient, new_certificate_id, resolve_redemption_cost, spendable,
};
use starquest_core::types::{EntityId, Stars};
use starquest_core::validation::{parse_optional_timestamp, validate_required_text};
use starquest_db::models::ledger::RedeemOutcome;
use starquest_db::models::redemption::{
    Certificate, CreateRedemptionRequest, NewRedemption, PrizeRedemption, RedeemRequest,
    RedemptionListItem,
};
use starquest_db::repositories::{LedgerRepo, PrizeRepo, RedemptionRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/prizes/redeem
pub async fn redeem(
    State(state): State<AppState>,
    Json(input): Json<RedeemRequest>,
) -> AppResult<(StatusCode, Json<Certificate>)> {
    let stars_cost = price_for(&state, input.prize_id, input.stars_cost).await?;
    let redemption = NewRedemption {
        id: EntityId::new_v4(),
        prize_id: input.prize_id,
        seeker_id: input.seeker_id,
        stars_cost,
        redeemed_at: Utc::now(),
        certificate_id: new_certificate_id(),
    };

    let record = record_redemption(&state, &redemption).await?;
    Ok((
        StatusCode::CREATED,
        Json(Certificate {
            certificate_id: record.certificate_id,
        }),
    ))
}

/// POST /api/prize-redemptions
///
/// Like `/prizes/redeem`, but the caller may supply the id, certificate id,
/// and timestamp, and gets the full record back.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateRedemptionRequest>,
) -> AppResult<(StatusCode, Json<PrizeRedemption>)> {
    let redeemed_at = parse_optional_timestamp("redeemed_at", input.redeemed_at.as_deref())?
        .unwrap_or_else(Utc::now);
    if let Some(certificate_id) = &input.certificate_id {
        validate_required_text("certificate_id", certificate_id)?;
    }
    let stars_cost = price_for(&state, input.prize_id, input.stars_cost).await?;

    let redemption = NewRedemption {
        id: input.id.unwrap_or_else(EntityId::new_v4),
        prize_id: input.prize_id,
        seeker_id: input.seeker_id,
        stars_cost,
        redeemed_at,
        certificate_id: input.certificate_id.unwrap_or_else(new_certificate_id),
    };

    let record = record_redemption(&state, &redemption).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/prize-redemptions
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<RedemptionListItem>>> {
    let redemptions = RedemptionRepo::list_all(&state.pool).await?;
    Ok(Json(redemptions))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look up the prize and settle what the redemption costs.
async fn price_for(state: &AppState, prize_id: EntityId, quoted: Option<Stars>) -> AppResult<Stars> {
    let prize = PrizeRepo::find_by_id(&state.pool, prize_id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Prize", prize_id)))?;
    if !prize.available {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Prize {prize_id} is not available"
        ))));
    }
    Ok(resolve_redemption_cost(prize_id, prize.stars_cost, quoted)?)
}

async fn record_redemption(
    state: &AppState,
    redemption: &NewRedemption,
) -> AppResult<PrizeRedemption> {
    match LedgerRepo::redeem(&state.pool, redemption).await? {
        RedeemOutcome::Redeemed(record) => {
            tracing::info!(
                redemption_id = %record.id,
                prize_id = %record.prize_id,
                seeker_id = %record.seeker_id,
                stars_cost = record.stars_cost,
                certificate_id = %record.certificate_id,
                "Prize redeemed",
            );
            Ok(record)
        }
        RedeemOutcome::SeekerNotFound => Err(AppError::Core(CoreError::not_found(
            "Seeker",
            redemption.seeker_id,
        ))),
        RedeemOutcome::InsufficientBalance { available } => {
            let available = spendable(available);
            tracing::info!(
                seeker_id = %redemption.seeker_id,
                required = redemption.stars_cost,
                available,
                "Redemption refused, not enough stars",
            );
            ensure_sufficient(redemption.seeker_id, available, redemption.stars_cost)?;
            // The re-read balance covers the cost: a credit landed between
            // the guarded debit and the re-read.
            Err(AppError::Core(CoreError::Conflict(format!(
                "Balance of seeker {} changed during redemption, retry",
                redemption.seeker_id
            ))))
        }
    }
}
