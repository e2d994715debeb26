//! Extractors that reject with [`AppError`] instead of axum's plain-text bodies.

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use crackers_core::types::DbId;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A numeric `{id}` path segment. Anything else is a 400 before any store access.
#[derive(Debug, Clone, Copy)]
pub struct EntityId(pub DbId);

impl<S: Send + Sync> FromRequestParts<S> for EntityId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<DbId>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest("Invalid id".into()))?;
        Ok(Self(id))
    }
}

/// Query string parameters.
#[derive(Debug)]
pub struct ListQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ListQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// A JSON request body.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
