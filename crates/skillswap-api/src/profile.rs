//! Handlers for `/profile`.

use axum::{
  Json,
  extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
};
use serde::Deserialize;
use serde_json::{Value, json};
use skillswap_core::{accounts, store::DocumentStore};

use crate::{AppState, accounts::EmailParams, error::ApiError};

/// `GET /profile?email=<email>`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  params: Result<Query<EmailParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore,
{
  let Query(params) = params?;
  let email = params.email.unwrap_or_default();
  let profile = accounts::get_profile(state.store.as_ref(), &email).await?;
  Ok(Json(json!({ "profile": profile })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileBody {
  pub email:   Option<String>,
  /// Must be a JSON object; anything else is rejected by the service.
  pub profile: Option<Value>,
}

/// `POST /profile` — replaces the whole profile object.
pub async fn save<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<ProfileBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore,
{
  let Json(body) = body?;
  accounts::save_profile(
    state.store.as_ref(),
    body.email.as_deref().unwrap_or_default(),
    body.profile,
  )
  .await?;
  Ok(Json(json!({ "message": "profile updated" })))
}
