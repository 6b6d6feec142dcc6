pub mod health;
pub mod prizes;
pub mod quests;
pub mod redemptions;
pub mod seekers;
pub mod suggestions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /seekers                       list, create
/// /seekers/identify              find seeker by PIN (POST)
/// /seekers/{id}                  get (derived balance), update, delete
/// /seekers/{id}/quests           open quests on the seeker's board
/// /seekers/{id}/redemptions      redemption history
/// /seekers/{id}/reconcile        recompute cached balance (POST)
///
/// /quests                        list, create
/// /quests/history                completed quests with seeker names
/// /quests/{id}                   get, update, delete
/// /quests/{id}/start             (POST)
/// /quests/{id}/complete          (POST)
/// /quests/{id}/approve           (POST)
/// /quests/{id}/reject            (POST)
/// /quests/{id}/assign            (POST)
///
/// /quest-suggestions             list, create
/// /quest-suggestions/{id}        update (pending only)
/// /quest-suggestions/{id}/approve  (POST)
/// /quest-suggestions/{id}/reject   (POST)
///
/// /prizes                        list (?include_unavailable), create
/// /prizes/redeem                 redeem (POST)
/// /prizes/{id}                   get, update, delete
///
/// /prize-redemptions             list, create
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/seekers", seekers::router())
        .nest("/quests", quests::router())
        .nest("/quest-suggestions", suggestions::router())
        .nest("/prizes", prizes::router())
        .nest("/prize-redemptions", redemptions::router())
}
