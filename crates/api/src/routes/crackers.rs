//! Route definitions for catalog entries.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::crackers;
use crate::state::AppState;

/// Largest accepted multipart body. Above the image ceiling so oversized
/// images get a validation error instead of a transport error.
pub const MULTIPART_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Routes mounted at `/crackers`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create (multipart)
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update (multipart)
/// DELETE /{id}           -> delete
/// PATCH  /{id}/status    -> set_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(crackers::list).post(crackers::create))
        .route(
            "/{id}",
            get(crackers::get_by_id)
                .put(crackers::update)
                .delete(crackers::delete),
        )
        .route("/{id}/status", patch(crackers::set_status))
        .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT))
}
