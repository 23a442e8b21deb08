//! Handlers for account endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/register` | Body: [`Registration`]; 201 + session cookie |
//! | `POST` | `/login` | Body: [`LoginBody`]; 200 + session cookie |
//! | `POST` | `/logout` | Clears the session cookie |
//! | `GET`  | `/me` | User for the current session, or `null` |
//! | `GET`  | `/users/by-email` | `?email`; public summary or `null` |

use axum::{
  Json,
  extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use skillswap_core::{accounts, accounts::Registration, store::DocumentStore};

use crate::{AppState, error::ApiError};

// ─── Register ─────────────────────────────────────────────────────────────────

/// `POST /register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<Registration>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let Json(input) = body?;
  let user = accounts::register(state.store.as_ref(), input).await?;
  let token = state.sessions.create(&user.email).await;

  Ok((
    StatusCode::CREATED,
    [(header::SET_COOKIE, state.sessions.set_cookie(&token))],
    Json(json!({ "message": "registered", "user": user })),
  ))
}

// ─── Login / logout ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
  pub email:    Option<String>,
  pub password: Option<String>,
}

/// `POST /login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let Json(body) = body?;
  let user = accounts::login(
    state.store.as_ref(),
    body.email.as_deref().unwrap_or_default(),
    body.password.as_deref().unwrap_or_default(),
  )
  .await?;
  let token = state.sessions.create(&user.email).await;

  Ok((
    [(header::SET_COOKIE, state.sessions.set_cookie(&token))],
    Json(json!({ "message": "logged in", "user": user })),
  ))
}

/// `POST /logout` — always succeeds, even without a session.
pub async fn logout<S>(State(state): State<AppState<S>>, headers: HeaderMap) -> impl IntoResponse
where
  S: DocumentStore,
{
  state.sessions.destroy(&headers).await;
  (
    [(header::SET_COOKIE, state.sessions.clear_cookie())],
    Json(json!({ "message": "logged out" })),
  )
}

// ─── Lookups ──────────────────────────────────────────────────────────────────

/// `GET /me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore,
{
  let user = match state.sessions.resolve(&headers).await {
    Some(email) => accounts::find_user(state.store.as_ref(), &email).await?,
    None => None,
  };
  Ok(Json(json!({ "user": user })))
}

#[derive(Debug, Default, Deserialize)]
pub struct EmailParams {
  pub email: Option<String>,
}

/// `GET /users/by-email?email=<email>`
pub async fn by_email<S>(
  State(state): State<AppState<S>>,
  params: Result<Query<EmailParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore,
{
  let Query(params) = params?;
  let email = params.email.unwrap_or_default();
  let summary = accounts::find_user(state.store.as_ref(), &email)
    .await?
    .map(|u| json!({ "id": u.id, "email": u.email, "name": u.display_name() }));
  Ok(Json(json!({ "user": summary })))
}
