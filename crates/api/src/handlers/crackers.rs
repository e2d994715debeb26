//! Handlers for the `/crackers` resource.
//!
//! Writes go through the [`CatalogCoordinator`](crate::catalog::CatalogCoordinator)
//! so images and records stay consistent; reads hit the record store directly.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use crackers_core::catalog::{CrackerForm, ImageUpload, CRACKER_PAGE_BOUNDS, DEFAULT_CRACKER_SORT};
use crackers_core::error::CoreError;
use crackers_core::pagination::{Page, PageRequest, Sort};
use crackers_db::models::cracker::{Cracker, CrackerListQuery};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::extract::{EntityId, JsonBody, ListQuery};
use crate::query::CrackerListParams;
use crate::state::AppState;

/// Multipart field carrying the image file.
const IMAGE_FIELD: &str = "image";

/// GET /api/crackers?page=&limit=&sort=&onlyActive=
pub async fn list(
    State(state): State<AppState>,
    ListQuery(params): ListQuery<CrackerListParams>,
) -> AppResult<Json<Page<Cracker>>> {
    let only_active = params.only_active();
    let sort = Sort::parse(params.sort.as_deref(), DEFAULT_CRACKER_SORT)?;
    let page = PageRequest::clamped(params.page, params.limit, CRACKER_PAGE_BOUNDS);
    let query = CrackerListQuery {
        only_active,
        sort,
        page,
    };

    let (items, total) = tokio::try_join!(
        state.records.list_crackers(&query),
        state.records.count_crackers(only_active),
    )?;
    Ok(Json(Page::new(items, page, total)))
}

/// GET /api/crackers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<Json<Cracker>> {
    let cracker = state
        .records
        .find_cracker(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Cracker",
            id,
        }))?;
    Ok(Json(cracker))
}

/// POST /api/crackers (multipart, optional `image` part)
pub async fn create(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<Cracker>)> {
    let (form, image) = read_cracker_form(multipart?).await?;
    let cracker = state.catalog.create(form, image).await?;
    Ok((StatusCode::CREATED, Json(cracker)))
}

/// PUT /api/crackers/{id} (multipart, partial; optional `image` part)
pub async fn update(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<Cracker>> {
    let (form, image) = read_cracker_form(multipart?).await?;
    let cracker = state.catalog.update(id, form, image).await?;
    Ok(Json(cracker))
}

/// PATCH /api/crackers/{id}/status `{ "status": bool }`
pub async fn set_status(
    State(state): State<AppState>,
    EntityId(id): EntityId,
    JsonBody(body): JsonBody<Value>,
) -> AppResult<Json<Cracker>> {
    let is_active = body
        .get("status")
        .and_then(Value::as_bool)
        .ok_or_else(|| CoreError::Validation("status must be a boolean".into()))?;
    let cracker = state.catalog.set_active(id, is_active).await?;
    Ok(Json(cracker))
}

/// DELETE /api/crackers/{id}
pub async fn delete(
    State(state): State<AppState>,
    EntityId(id): EntityId,
) -> AppResult<Json<Value>> {
    state.catalog.delete(id).await?;
    Ok(Json(json!({ "message": "Deleted successfully" })))
}

/// Split a multipart body into text fields and the optional image part.
///
/// An image part with no bytes and no file name (an empty file input) counts
/// as absent. Unknown fields are ignored.
async fn read_cracker_form(
    mut multipart: Multipart,
) -> AppResult<(CrackerForm, Option<ImageUpload>)> {
    let mut form = CrackerForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name == IMAGE_FIELD {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let file_name = field
                .file_name()
                .filter(|f| !f.is_empty())
                .map(str::to_string);
            let bytes = field.bytes().await?;
            if bytes.is_empty() && file_name.is_none() {
                continue;
            }
            image = Some(ImageUpload {
                bytes: bytes.to_vec(),
                content_type,
                file_name,
            });
        } else {
            let value = field.text().await?;
            form.set_field(&name, value);
        }
    }

    Ok((form, image))
}
