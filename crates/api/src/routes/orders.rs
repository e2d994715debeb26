use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

/// Routes mounted at `/orders`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// GET    /{id}           -> get_by_id
/// DELETE /{id}           -> delete
/// PATCH  /{id}/status    -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route("/{id}", get(orders::get_by_id).delete(orders::delete))
        .route("/{id}/status", patch(orders::update_status))
}
