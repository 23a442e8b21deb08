//! Channel registry: which live connections are joined to which email.

use std::{
  collections::HashMap,
  sync::{PoisonError, RwLock},
};

use skillswap_core::bus::{DeliveryBus, Event, PublishError};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

/// Identifies one socket connection for its lifetime.
pub type ConnectionId = Uuid;

/// Events a connection may have queued before new ones are dropped.
pub const OUTBOX_CAPACITY: usize = 256;

/// The sending half of a connection's bounded outbound event queue.
pub type Outbox = mpsc::Sender<Event>;

/// Maps channel name → joined connections.
///
/// The lock is held only for map updates and non-blocking sends, never
/// across an `.await`.
#[derive(Debug, Default)]
pub struct ChannelHub {
  channels: RwLock<HashMap<String, HashMap<ConnectionId, Outbox>>>,
}

impl ChannelHub {
  pub fn new() -> Self { Self::default() }

  /// Join `connection` to `channel`. Returns `false` if it was already joined,
  /// in which case nothing changes.
  pub fn join(&self, channel: &str, connection: ConnectionId, outbox: Outbox) -> bool {
    let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
    let members = channels.entry(channel.to_owned()).or_default();
    if members.contains_key(&connection) {
      return false;
    }
    members.insert(connection, outbox);
    true
  }

  /// Remove `connection` from `channel`, dropping the channel once empty.
  pub fn leave(&self, channel: &str, connection: ConnectionId) {
    let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(members) = channels.get_mut(channel) {
      members.remove(&connection);
      if members.is_empty() {
        channels.remove(channel);
      }
    }
  }

  #[cfg(test)]
  pub(crate) fn subscriber_count(&self, channel: &str) -> usize {
    self
      .channels
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(channel)
      .map_or(0, HashMap::len)
  }
}

impl DeliveryBus for ChannelHub {
  fn publish(&self, channel: &str, event: &Event) -> Result<usize, PublishError> {
    let channels = self.channels.read().map_err(|_| PublishError {
      channel: channel.to_owned(),
      reason:  "channel registry lock poisoned".into(),
    })?;

    let Some(members) = channels.get(channel) else {
      return Ok(0);
    };

    let mut delivered = 0;
    for (connection, outbox) in members {
      match outbox.try_send(event.clone()) {
        Ok(()) => delivered += 1,
        Err(TrySendError::Full(_)) => {
          warn!(%connection, channel, "outbox full; dropping event for slow connection");
        }
        Err(TrySendError::Closed(_)) => {
          debug!(%connection, channel, "skipping closed connection");
        }
      }
    }
    Ok(delivered)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn event() -> Event { Event::new("new_message", json!({ "n": 1 })) }

  #[test]
  fn publish_reaches_every_joined_connection() {
    let hub = ChannelHub::new();
    let (tx1, mut rx1) = mpsc::channel(OUTBOX_CAPACITY);
    let (tx2, mut rx2) = mpsc::channel(OUTBOX_CAPACITY);
    let (tx3, mut rx3) = mpsc::channel(OUTBOX_CAPACITY);

    hub.join("a@x.com", Uuid::new_v4(), tx1);
    hub.join("a@x.com", Uuid::new_v4(), tx2);
    hub.join("b@x.com", Uuid::new_v4(), tx3);

    assert_eq!(hub.publish("a@x.com", &event()).unwrap(), 2);
    assert_eq!(rx1.try_recv().unwrap(), event());
    assert_eq!(rx2.try_recv().unwrap(), event());
    assert!(rx3.try_recv().is_err());
  }

  #[test]
  fn publish_to_empty_channel_is_not_an_error() {
    let hub = ChannelHub::new();
    assert_eq!(hub.publish("nobody@x.com", &event()).unwrap(), 0);
  }

  #[test]
  fn joining_twice_does_not_duplicate_delivery() {
    let hub = ChannelHub::new();
    let id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel(OUTBOX_CAPACITY);

    assert!(hub.join("a@x.com", id, tx.clone()));
    assert!(!hub.join("a@x.com", id, tx));
    assert_eq!(hub.subscriber_count("a@x.com"), 1);

    hub.publish("a@x.com", &event()).unwrap();
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
  }

  #[test]
  fn leave_removes_membership() {
    let hub = ChannelHub::new();
    let id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel(OUTBOX_CAPACITY);
    hub.join("a@x.com", id, tx);

    hub.leave("a@x.com", id);
    assert_eq!(hub.subscriber_count("a@x.com"), 0);
    assert_eq!(hub.publish("a@x.com", &event()).unwrap(), 0);
    assert!(rx.try_recv().is_err());
  }

  #[test]
  fn closed_connections_are_skipped() {
    let hub = ChannelHub::new();
    let (tx, rx) = mpsc::channel(OUTBOX_CAPACITY);
    hub.join("a@x.com", Uuid::new_v4(), tx);
    drop(rx);
    assert_eq!(hub.publish("a@x.com", &event()).unwrap(), 0);
  }

  #[test]
  fn full_outbox_drops_instead_of_blocking() {
    let hub = ChannelHub::new();
    let (tx, mut rx) = mpsc::channel(1);
    hub.join("a@x.com", Uuid::new_v4(), tx);

    assert_eq!(hub.publish("a@x.com", &event()).unwrap(), 1);
    assert_eq!(hub.publish("a@x.com", &event()).unwrap(), 0);
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
  }
}
