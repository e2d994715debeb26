//! Handlers for the `/orders` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use crackers_core::error::CoreError;
use crackers_core::order::{DEFAULT_ORDER_SORT, ORDER_PAGE_BOUNDS};
use crackers_core::pagination::{Page, PageRequest, Sort};
use crackers_core::types::DbId;
use crackers_db::models::order::{CreateOrder, Order, OrderListQuery, OrderStatus};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::extract::{EntityId, JsonBody, ListQuery};
use crate::query::OrderListParams;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Order", id })
}

/// GET /api/orders?page=&limit=&sort=
pub async fn list(
    State(state): State<AppState>,
    ListQuery(params): ListQuery<OrderListParams>,
) -> AppResult<Json<Page<Order>>> {
    let sort = Sort::parse(params.sort.as_deref(), DEFAULT_ORDER_SORT)?;
    let page = PageRequest::clamped(params.page, params.limit, ORDER_PAGE_BOUNDS);
    let query = OrderListQuery { sort, page };

    let (items, total) = tokio::try_join!(
        state.records.list_orders(&query),
        state.records.count_orders(),
    )?;
    Ok(Json(Page::new(items, page, total)))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<Json<Order>> {
    let order = state
        .records
        .find_order(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(order))
}

/// POST /api/orders
///
/// A duplicate order number is a 409.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateOrder>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let new_order = input.into_new_order()?;
    let order = state.records.insert_order(&new_order).await?;
    tracing::info!(order_id = order.id, order_number = %order.order_number, "Order created");
    Ok((StatusCode::CREATED, Json(order)))
}

/// PATCH /api/orders/{id}/status `{ "status": "pending" | "dispatched" }`
///
/// The status is validated before the store is touched.
pub async fn update_status(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<Order>> {
    let raw = body
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| CoreError::Validation("status is required".into()))?;
    let status = OrderStatus::parse(raw)?;

    let order = state
        .records
        .update_order_status(id, status)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(order_id = id, status = status.as_str(), "Order status updated");
    Ok(Json(order))
}

/// DELETE /api/orders/{id}
pub async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<Json<Value>> {
    if !state.records.delete_order(id).await? {
        return Err(not_found(id));
    }
    tracing::info!(order_id = id, "Order deleted");
    Ok(Json(json!({ "message": "Order deleted successfully" })))
}
