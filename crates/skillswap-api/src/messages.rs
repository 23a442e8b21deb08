//! Handler for `POST /messages` (and the legacy `POST /messages/send`).
//!
//! Sends go through the same [`messaging::send_message`] call as socket
//! sends, so both participants' live connections see REST messages too.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use serde_json::json;
use skillswap_core::{
  messaging::{self, SendMessage},
  store::DocumentStore,
};

use crate::{AppState, error::ApiError};

/// `POST /messages` — returns 201 + `{conversationId, message}`.
pub async fn send<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<SendMessage>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let Json(input) = body?;
  let message = messaging::send_message(state.store.as_ref(), state.hub.as_ref(), input.clone())
    .await?;

  let conversation_id = input.conversation_id.unwrap_or_default();
  Ok((
    StatusCode::CREATED,
    Json(json!({ "conversationId": conversation_id.trim(), "message": message })),
  ))
}
