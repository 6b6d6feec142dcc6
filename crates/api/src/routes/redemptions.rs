use axum::routing::get;
use axum::Router;

use crate::handlers::redemption;
use crate::state::AppState;

/// Routes mounted at `/prize-redemptions`.
///
/// ```text
/// GET    /     -> list
/// POST   /     -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(redemption::list).post(redemption::create))
}
