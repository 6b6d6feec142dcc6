//! Route definitions for the `/quest-suggestions` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::suggestion;
use crate::state::AppState;

/// Routes mounted at `/quest-suggestions`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// PUT    /{id}             -> update
/// POST   /{id}/approve     -> approve
/// POST   /{id}/reject      -> reject
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(suggestion::list).post(suggestion::create))
        .route("/{id}", put(suggestion::update))
        .route("/{id}/approve", post(suggestion::approve))
        .route("/{id}/reject", post(suggestion::reject))
}
