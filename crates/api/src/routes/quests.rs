//! Route definitions for the `/quests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::quest;
use crate::state::AppState;

/// Routes mounted at `/quests`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /history          -> history
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete
/// POST   /{id}/start       -> start
/// POST   /{id}/complete    -> complete
/// POST   /{id}/approve     -> approve
/// POST   /{id}/reject      -> reject
/// POST   /{id}/assign      -> assign
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(quest::list).post(quest::create))
        .route("/history", get(quest::history))
        .route(
            "/{id}",
            get(quest::get_by_id)
                .put(quest::update)
                .delete(quest::delete),
        )
        .route("/{id}/start", post(quest::start))
        .route("/{id}/complete", post(quest::complete))
        .route("/{id}/approve", post(quest::approve))
        .route("/{id}/reject", post(quest::reject))
        .route("/{id}/assign", post(quest::assign))
}
