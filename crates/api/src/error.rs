use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crackers_core::error::CoreError;
use crackers_db::store::StoreError;
use serde_json::json;

use crate::catalog::CatalogError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain, store and catalog errors and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// bodies of the form `{ "error", "code", "details"? }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `crackers_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A record store error outside the catalog write path.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A coordinated catalog write failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

struct ErrorBody {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<String>,
}

impl ErrorBody {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Store(err) => classify_store_error(err),
            AppError::Catalog(err) => match err {
                CatalogError::Core(core) => classify_core_error(core),
                CatalogError::Upstream(asset) => {
                    tracing::error!(error = %asset, "Asset store error");
                    ErrorBody::new(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "UPSTREAM_ASSET_ERROR",
                        "Image upload failed",
                    )
                    .with_details(asset.to_string())
                }
                CatalogError::Store(StoreError::Database(db)) => ErrorBody::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "Failed to save cracker",
                )
                .with_details(db.to_string()),
                CatalogError::Store(store) => classify_store_error(store),
                CatalogError::Task(msg) => {
                    tracing::error!(error = %msg, "Catalog task failed");
                    ErrorBody::new(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred",
                    )
                }
            },
            AppError::BadRequest(msg) => {
                ErrorBody::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
        };

        let mut json = json!({
            "error": body.message,
            "code": body.code,
        });
        if let Some(details) = body.details {
            json["details"] = details.into();
        }

        (body.status, axum::Json(json)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> ErrorBody {
    match core {
        CoreError::NotFound { entity, id } => ErrorBody::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => {
            ErrorBody::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
    }
}

/// Unique violations map to 409; everything else is a sanitized 500.
fn classify_store_error(err: &StoreError) -> ErrorBody {
    match err {
        StoreError::Duplicate { constraint } => ErrorBody::new(
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        StoreError::Database(db) => {
            tracing::error!(error = %db, "Database error");
            ErrorBody::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                "An internal error occurred",
            )
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
