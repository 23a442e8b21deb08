//! Handlers for conversation lookup and creation.
//!
//! Also mounted at the legacy paths `GET /messages` and
//! `POST /messages/conversation`.

use axum::{
  Json,
  extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use skillswap_core::{Error, directory, store::DocumentStore};

use crate::{AppState, accounts::EmailParams, error::ApiError};

/// `GET /conversations?email=<email>` — most recently active first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: Result<Query<EmailParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore,
{
  let Query(params) = params?;
  let email = params.email.unwrap_or_default();
  let conversations = directory::list_for_user(state.store.as_ref(), &email).await?;
  Ok(Json(json!({ "conversations": conversations })))
}

#[derive(Debug, Default, Deserialize)]
pub struct FindOrCreateBody {
  #[serde(default)]
  pub participants: Vec<String>,
}

/// `POST /conversations` — 201 when the conversation was created by this
/// call, 200 when it already existed.
pub async fn find_or_create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<FindOrCreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let Json(body) = body?;
  let [a, b] = body.participants.as_slice() else {
    return Err(Error::Validation("participants must be two different emails".into()).into());
  };

  let resolved = directory::find_or_create(state.store.as_ref(), a, b).await?;
  let status = if resolved.created { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(json!({ "conversation": resolved.conversation }))))
}
