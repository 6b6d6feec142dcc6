//! Route definitions for the `/prizes` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{prize, redemption};
use crate::state::AppState;

/// Routes mounted at `/prizes`.
///
/// ```text
/// GET    /            -> list
/// POST   /            -> create
/// POST   /redeem      -> redemption::redeem
/// GET    /{id}        -> get_by_id
/// PUT    /{id}        -> update
/// DELETE /{id}        -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(prize::list).post(prize::create))
        .route("/redeem", post(redemption::redeem))
        .route(
            "/{id}",
            get(prize::get_by_id)
                .put(prize::update)
                .delete(prize::delete),
        )
}
