//! HTTP and WebSocket transport for SkillSwap.
//!
//! Exposes an axum [`Router`] backed by any
//! [`skillswap_core::store::DocumentStore`]. REST routes live under `/api`;
//! the real-time socket is upgraded at `/socket`. TLS and CORS are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let sessions = Sessions::new("skillswap_session", session::DEFAULT_TTL);
//! let app = skillswap_api::router(AppState::new(store, sessions));
//! axum::serve(listener, app).await?;
//! ```

pub mod accounts;
pub mod contacts;
pub mod conversations;
pub mod error;
pub mod messages;
pub mod profile;
pub mod realtime;
pub mod resources;
pub mod session;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post, put},
};
use serde_json::{Value, json};
use skillswap_core::store::DocumentStore;

pub use error::ApiError;
use realtime::hub::ChannelHub;
pub use session::Sessions;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers and socket connections.
#[derive(Clone)]
pub struct AppState<S: DocumentStore> {
  pub store:    Arc<S>,
  pub hub:      Arc<ChannelHub>,
  pub sessions: Arc<Sessions>,
}

impl<S: DocumentStore> AppState<S> {
  /// Fresh state around `store` and `sessions`, with an empty channel hub.
  pub fn new(store: S, sessions: Sessions) -> Self {
    Self {
      store:    Arc::new(store),
      hub:      Arc::new(ChannelHub::new()),
      sessions: Arc::new(sessions),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: DocumentStore + Clone + 'static,
{
  let api = Router::new()
    // Accounts
    .route("/register", post(accounts::register::<S>))
    .route("/login", post(accounts::login::<S>))
    .route("/logout", post(accounts::logout::<S>))
    .route("/me", get(accounts::me::<S>))
    .route("/users/by-email", get(accounts::by_email::<S>))
    .route("/profile", get(profile::get_one::<S>).post(profile::save::<S>))
    // Board
    .route("/resources", get(resources::list::<S>).post(resources::create::<S>))
    .route("/resources/{id}", put(resources::set_likes::<S>))
    .route("/contacts", get(contacts::list::<S>).post(contacts::create::<S>))
    // Messaging
    .route(
      "/conversations",
      get(conversations::list::<S>).post(conversations::find_or_create::<S>),
    )
    .route("/messages", get(conversations::list::<S>).post(messages::send::<S>))
    .route("/messages/conversation", post(conversations::find_or_create::<S>))
    .route("/messages/send", post(messages::send::<S>));

  Router::new()
    .route("/", get(liveness))
    .route("/socket", get(realtime::socket::upgrade::<S>))
    .nest("/api", api)
    .with_state(state)
}

/// `GET /`
async fn liveness() -> Json<Value> {
  Json(json!({ "message": "SkillSwap API is running" }))
}

#[cfg(test)]
mod tests;
