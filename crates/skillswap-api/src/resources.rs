//! Handlers for `/resources` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/resources` | Optional `?category`; newest first |
//! | `POST` | `/resources` | Any JSON object with a `title`; returns 201 |
//! | `PUT`  | `/resources/{id}` | Body: `{"likes": n}` |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::{JsonRejection, PathRejection, QueryRejection}},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use skillswap_core::{board, resource::Resource, store::DocumentStore};

use crate::{AppState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub category: Option<String>,
}

/// `GET /resources[?category=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore,
{
  let Query(params) = params?;
  let resources = board::list_resources(state.store.as_ref(), params.category.as_deref()).await?;
  Ok(Json(json!({ "resources": resources })))
}

/// `POST /resources` — returns 201 + the stored [`Resource`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let Json(body) = body?;
  let resource = board::create_resource(state.store.as_ref(), body).await?;
  Ok((StatusCode::CREATED, Json(resource)))
}

/// `PUT /resources/{id}`
pub async fn set_likes<S>(
  State(state): State<AppState<S>>,
  id: Result<Path<String>, PathRejection>,
  body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<Resource>, ApiError>
where
  S: DocumentStore,
{
  let Path(id) = id?;
  let Json(body) = body?;
  let resource = board::set_likes(state.store.as_ref(), &id, body.get("likes")).await?;
  Ok(Json(resource))
}
