//! Conversations between exactly two participants, and the messages they
//! exchange.
//!
//! A conversation is identified publicly by an opaque token. Its participant
//! pair is always held in canonical (sorted) order so that "the conversation
//! between A and B" is a plain equality lookup regardless of who asks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, clock, identity};

// ─── Participants ────────────────────────────────────────────────────────────

/// A canonical pair of normalised, distinct emails in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[String; 2]", into = "[String; 2]")]
pub struct Participants([String; 2]);

impl Participants {
  /// Normalise both emails and order them.
  ///
  /// Fails when either email is blank or both name the same person.
  pub fn canonical(a: &str, b: &str) -> Result<Self> {
    let a = identity::normalize_email(a);
    let b = identity::normalize_email(b);
    if a.is_empty() || b.is_empty() || a == b {
      return Err(Error::Validation(
        "participants must be two different emails".into(),
      ));
    }
    let mut pair = [a, b];
    pair.sort();
    Ok(Self(pair))
  }

  pub fn first(&self) -> &str { &self.0[0] }

  pub fn second(&self) -> &str { &self.0[1] }
}

impl TryFrom<[String; 2]> for Participants {
  type Error = Error;

  fn try_from([a, b]: [String; 2]) -> Result<Self> { Self::canonical(&a, &b) }
}

impl From<Participants> for [String; 2] {
  fn from(p: Participants) -> Self { p.0 }
}

// ─── Message ─────────────────────────────────────────────────────────────────

/// One immutable entry in a conversation's message sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  /// Opaque token, unique within the owning conversation.
  pub id:        String,
  pub from:      String,
  pub to:        String,
  pub text:      String,
  pub timestamp: DateTime<Utc>,
}

impl Message {
  /// Stamp a new message with a fresh id and the current time.
  ///
  /// Inputs are expected to be normalised already.
  pub fn new(from: String, to: String, text: String) -> Self {
    Self {
      id: identity::new_token(),
      from,
      to,
      text,
      timestamp: clock::now(),
    }
  }
}

// ─── Conversation ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
  pub id:           String,
  pub participants: Participants,
  /// In append order.
  pub messages:     Vec<Message>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

impl Conversation {
  /// A fresh, empty conversation between `participants`.
  pub fn new(participants: Participants) -> Self {
    let now = clock::now();
    Self {
      id: identity::new_token(),
      participants,
      messages: Vec::new(),
      created_at: now,
      updated_at: now,
    }
  }
}
