//! Conversation directory: maps an unordered pair of emails to its single
//! conversation.

use tracing::debug;

use crate::{
  Error, Result,
  conversation::{Conversation, Participants},
  identity,
  store::{DocumentStore, Insert},
};

/// Result of [`find_or_create`].
#[derive(Debug, Clone)]
pub struct Resolved {
  pub conversation: Conversation,
  /// `true` only when this call inserted the conversation.
  pub created:      bool,
}

/// Return the conversation between `email_a` and `email_b`, creating it on
/// first contact.
///
/// Argument order does not matter. When a concurrent caller inserts the same
/// pair first, the store's uniqueness constraint rejects our insert and the
/// winner's record is returned instead.
pub async fn find_or_create<S>(store: &S, email_a: &str, email_b: &str) -> Result<Resolved>
where
  S: DocumentStore,
{
  let participants = Participants::canonical(email_a, email_b)?;

  if let Some(existing) = store
    .find_conversation_by_participants(&participants)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
  {
    return Ok(Resolved { conversation: existing, created: false });
  }

  let conversation = Conversation::new(participants);
  let outcome = store
    .insert_conversation(&conversation)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  match outcome {
    Insert::Created => {
      debug!(conversation_id = %conversation.id, "created conversation");
      Ok(Resolved { conversation, created: true })
    }
    Insert::AlreadyExists => {
      debug!("lost conversation insert race, returning existing record");
      let winner = store
        .find_conversation_by_participants(&conversation.participants)
        .await
        .map_err(|e| Error::Store(Box::new(e)))?
        // The store reported a duplicate it cannot produce: its
        // uniqueness and lookup disagree.
        .ok_or_else(|| Error::Store("conversation vanished after duplicate insert".into()))?;
      Ok(Resolved { conversation: winner, created: false })
    }
  }
}

/// Every conversation `email` takes part in, most recently active first.
pub async fn list_for_user<S>(store: &S, email: &str) -> Result<Vec<Conversation>>
where
  S: DocumentStore,
{
  let email = identity::normalize_email(email);
  if email.is_empty() {
    return Err(Error::Validation("email is required".into()));
  }

  store
    .list_conversations(&email)
    .await
    .map_err(|e| Error::Store(Box::new(e)))
}
