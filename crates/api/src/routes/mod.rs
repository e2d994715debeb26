pub mod crackers;
pub mod health;
pub mod orders;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /crackers                    list, create
/// /crackers/{id}               get, update, delete
/// /crackers/{id}/status        set active flag (PATCH)
///
/// /orders                      list, create
/// /orders/{id}                 get, delete
/// /orders/{id}/status          set dispatch status (PATCH)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/crackers", crackers::router())
        .nest("/orders", orders::router())
}
