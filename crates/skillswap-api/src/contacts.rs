//! Handlers for `/contacts`.

use axum::{
  Json,
  extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use skillswap_core::{board, store::DocumentStore};

use crate::{AppState, accounts::EmailParams, error::ApiError};

/// `GET /contacts?email=<owner>`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: Result<Query<EmailParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore,
{
  let Query(params) = params?;
  let email = params.email.unwrap_or_default();
  let contacts = board::list_contacts(state.store.as_ref(), &email).await?;
  Ok(Json(json!({ "contacts": contacts })))
}

#[derive(Debug, Default, Deserialize)]
pub struct NewContactBody {
  #[serde(rename = "ownerEmail")]
  pub owner_email:   Option<String>,
  #[serde(rename = "contactEmail")]
  pub contact_email: Option<String>,
  pub name:          Option<String>,
}

/// `POST /contacts`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<NewContactBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let Json(body) = body?;
  let contact = board::add_contact(
    state.store.as_ref(),
    body.owner_email.as_deref().unwrap_or_default(),
    body.contact_email.as_deref().unwrap_or_default(),
    body.name.as_deref().unwrap_or_default(),
  )
  .await?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "contact added", "contact": contact })),
  ))
}
