//! Route definitions for the `/seekers` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::seeker;
use crate::state::AppState;

/// Routes mounted at `/seekers`.
///
/// ```text
/// GET    /                     -> list
/// POST   /                     -> create
/// POST   /identify             -> identify
/// GET    /{id}                 -> get_by_id
/// PUT    /{id}                 -> update
/// DELETE /{id}                 -> delete
/// GET    /{id}/quests          -> list_quests
/// GET    /{id}/redemptions     -> list_redemptions
/// POST   /{id}/reconcile       -> reconcile
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(seeker::list).post(seeker::create))
        .route("/identify", post(seeker::identify))
        .route(
            "/{id}",
            get(seeker::get_by_id)
                .put(seeker::update)
                .delete(seeker::delete),
        )
        .route("/{id}/quests", get(seeker::list_quests))
        .route("/{id}/redemptions", get(seeker::list_redemptions))
        .route("/{id}/reconcile", post(seeker::reconcile))
}
