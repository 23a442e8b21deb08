//! WebSocket endpoint at `GET /socket`.
//!
//! Every frame in either direction is a JSON text frame
//! `{"event": <name>, "data": <object>}`. A connection starts unregistered
//! and only receives `new_message` events after `register`.

use std::collections::HashSet;

use axum::{
  extract::{
    State,
    ws::{Message as Frame, WebSocket, WebSocketUpgrade},
  },
  response::Response,
};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use skillswap_core::{
  bus::{CONNECT_SUCCESS, ERROR, Event, MESSAGE_ERROR, REGISTER_ERROR, REGISTER_SUCCESS},
  identity,
  messaging::{self, SendMessage},
  store::DocumentStore,
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::hub::{ConnectionId, OUTBOX_CAPACITY, Outbox};
use crate::{AppState, error::public_message};

/// `GET /socket`
pub async fn upgrade<S>(ws: WebSocketUpgrade, State(state): State<AppState<S>>) -> Response
where
  S: DocumentStore + Clone + 'static,
{
  ws.on_upgrade(move |socket| serve(socket, state))
}

async fn serve<S>(socket: WebSocket, state: AppState<S>)
where
  S: DocumentStore + 'static,
{
  let (mut sink, mut stream) = socket.split();
  let (outbox, mut inbox) = mpsc::channel::<Event>(OUTBOX_CAPACITY);

  // Writer task: drains the outbox until every sender is gone.
  let writer = tokio::spawn(async move {
    while let Some(event) = inbox.recv().await {
      let text = match serde_json::to_string(&event) {
        Ok(text) => text,
        Err(e) => {
          error!(error = %e, event = %event.event, "failed to encode event");
          continue;
        }
      };
      if sink.send(Frame::Text(text.into())).await.is_err() {
        break;
      }
    }
  });

  let mut conn = Connection::new(state, outbox);
  info!(connection = %conn.id(), "socket connected");
  conn.greet();

  while let Some(frame) = stream.next().await {
    match frame {
      Ok(Frame::Text(text)) => conn.handle_text(text.as_str()).await,
      Ok(Frame::Binary(_)) => conn.emit(ERROR, json!({ "message": "expected a text frame" })),
      Ok(Frame::Close(_)) => break,
      // Pings are answered by the transport.
      Ok(Frame::Ping(_) | Frame::Pong(_)) => {}
      Err(e) => {
        debug!(connection = %conn.id(), error = %e, "socket read failed");
        break;
      }
    }
  }

  info!(connection = %conn.id(), "socket disconnected");
  drop(conn);
  if let Err(e) = writer.await {
    warn!(error = %e, "socket writer task failed");
  }
}

// ─── Connection ───────────────────────────────────────────────────────────────

/// Per-socket protocol state, independent of the underlying transport.
///
/// Outbound events go to the connection's [`Outbox`]; dropping the
/// connection leaves every channel it joined.
pub struct Connection<S: DocumentStore> {
  id:       ConnectionId,
  state:    AppState<S>,
  outbox:   Outbox,
  channels: HashSet<String>,
}

impl<S: DocumentStore> Connection<S> {
  pub fn new(state: AppState<S>, outbox: Outbox) -> Self {
    Self { id: Uuid::new_v4(), state, outbox, channels: HashSet::new() }
  }

  pub fn id(&self) -> ConnectionId { self.id }

  #[cfg(test)]
  fn channels(&self) -> impl Iterator<Item = &str> { self.channels.iter().map(String::as_str) }

  pub fn greet(&self) {
    self.emit(CONNECT_SUCCESS, json!({ "message": "connected to server" }));
  }

  /// Handle one inbound text frame.
  pub async fn handle_text(&mut self, text: &str) {
    let event: Event = match serde_json::from_str(text) {
      Ok(event) => event,
      Err(e) => {
        self.emit(ERROR, json!({ "message": format!("invalid frame: {e}") }));
        return;
      }
    };

    match event.event.as_str() {
      "register" => self.register(&event.data),
      "send_message" => self.send_message(event.data).await,
      other => {
        let message = format!("unknown event: {other}");
        self.emit(ERROR, json!({ "message": message }));
      }
    }
  }

  fn register(&mut self, data: &Value) {
    let email = data
      .get("email")
      .and_then(Value::as_str)
      .map(identity::normalize_email)
      .unwrap_or_default();
    if email.is_empty() {
      self.emit(REGISTER_ERROR, json!({ "message": "email required" }));
      return;
    }

    if self.channels.insert(email.clone()) {
      self.state.hub.join(&email, self.id, self.outbox.clone());
      info!(connection = %self.id, %email, "socket registered");
    }
    self.emit(
      REGISTER_SUCCESS,
      json!({ "message": format!("registered as {email}"), "email": email }),
    );
  }

  async fn send_message(&self, data: Value) {
    let input: SendMessage = match serde_json::from_value(data) {
      Ok(input) => input,
      Err(e) => {
        self.emit(MESSAGE_ERROR, json!({ "message": format!("invalid payload: {e}") }));
        return;
      }
    };

    // Success is reported through the `new_message` fan-out.
    if let Err(e) =
      messaging::send_message(self.state.store.as_ref(), self.state.hub.as_ref(), input).await
    {
      if e.is_internal() {
        error!(connection = %self.id, error = %e, "socket send failed");
      } else {
        warn!(connection = %self.id, error = %e, "socket send rejected");
      }
      self.emit(MESSAGE_ERROR, json!({ "message": public_message(&e) }));
    }
  }

  /// Queue an event for this connection only. The event is dropped if the
  /// outbox is full or the writer has gone.
  pub fn emit(&self, name: &str, data: Value) {
    match self.outbox.try_send(Event::new(name, data)) {
      Ok(()) => {}
      Err(TrySendError::Full(event)) => {
        warn!(connection = %self.id, event = %event.event, "outbox full; dropping event");
      }
      Err(TrySendError::Closed(_)) => {
        debug!(connection = %self.id, "socket writer gone; dropping event");
      }
    }
  }
}

impl<S: DocumentStore> Drop for Connection<S> {
  fn drop(&mut self) {
    for channel in &self.channels {
      self.state.hub.leave(channel, self.id);
    }
  }
}
