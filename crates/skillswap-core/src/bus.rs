//! The real-time delivery bus seam.
//!
//! A bus delivers named events to every connection currently joined to a
//! channel. Channels are keyed by normalised email. Delivery is at most once:
//! nothing is queued for connections that are not joined at publish time.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// Event names shared by every transport.
pub const CONNECT_SUCCESS: &str = "connect_success";
pub const REGISTER_SUCCESS: &str = "register_success";
pub const REGISTER_ERROR: &str = "register_error";
pub const NEW_MESSAGE: &str = "new_message";
pub const MESSAGE_ERROR: &str = "message_error";
pub const ERROR: &str = "error";

/// A named event with a JSON payload, e.g. `{"event":"new_message","data":{…}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub event: String,
  #[serde(default)]
  pub data:  Value,
}

impl Event {
  pub fn new(event: impl Into<String>, data: Value) -> Self {
    Self { event: event.into(), data }
  }
}

#[derive(Debug, Error)]
#[error("failed to publish to channel {channel:?}: {reason}")]
pub struct PublishError {
  pub channel: String,
  pub reason:  String,
}

/// Fan-out of events to named channels.
pub trait DeliveryBus: Send + Sync {
  /// Deliver `event` to every connection joined to `channel` and return how
  /// many accepted it. Zero subscribers is not an error.
  fn publish(&self, channel: &str, event: &Event) -> Result<usize, PublishError>;
}

/// A bus with no subscribers; every publish reaches nobody.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBus;

impl DeliveryBus for NullBus {
  fn publish(&self, _channel: &str, _event: &Event) -> Result<usize, PublishError> {
    Ok(0)
  }
}
