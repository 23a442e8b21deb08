//! Message append log.
//!
//! [`send_message`] is the only way a message enters the system. REST and
//! socket transports both call it, so persisted state and fan-out are the
//! same whichever way a message arrives.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::{
  Error, Result,
  bus::{DeliveryBus, Event, NEW_MESSAGE},
  conversation::Message,
  identity,
  store::DocumentStore,
};

/// Raw, un-normalised send request as it arrives from a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMessage {
  #[serde(rename = "conversationId")]
  pub conversation_id: Option<String>,
  pub from:            Option<String>,
  pub to:              Option<String>,
  pub text:            Option<String>,
}

/// Persist a message, then notify both parties.
///
/// Persistence and notification are separate steps: once the append has
/// succeeded the message is returned even if publishing fails.
pub async fn send_message<S, B>(store: &S, bus: &B, input: SendMessage) -> Result<Message>
where
  S: DocumentStore,
  B: DeliveryBus + ?Sized,
{
  let conversation_id = input.conversation_id.as_deref().unwrap_or_default().trim();
  let from = identity::normalize_email(input.from.as_deref().unwrap_or_default());
  let to = identity::normalize_email(input.to.as_deref().unwrap_or_default());
  let text = input.text.as_deref().unwrap_or_default().trim();

  if conversation_id.is_empty() || from.is_empty() || to.is_empty() || text.is_empty() {
    return Err(Error::Validation(
      "conversationId, from, to, text required".into(),
    ));
  }

  let message = Message::new(from, to, text.to_owned());

  let matched = store
    .append_message(conversation_id, &message)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  if !matched {
    return Err(Error::NotFound("conversation not found".into()));
  }
  debug!(%conversation_id, message_id = %message.id, "appended message");

  let event = new_message_event(conversation_id, &message);
  notify(bus, &message.from, &event);
  if message.to != message.from {
    notify(bus, &message.to, &event);
  }

  Ok(message)
}

/// The `new_message` event published for `message`.
pub fn new_message_event(conversation_id: &str, message: &Message) -> Event {
  Event::new(
    NEW_MESSAGE,
    json!({ "conversationId": conversation_id, "message": message }),
  )
}

fn notify<B>(bus: &B, channel: &str, event: &Event)
where
  B: DeliveryBus + ?Sized,
{
  match bus.publish(channel, event) {
    Ok(delivered) => debug!(%channel, delivered, "published new_message"),
    Err(e) => warn!(error = %e, "real-time delivery failed"),
  }
}
