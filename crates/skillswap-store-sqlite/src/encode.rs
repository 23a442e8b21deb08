//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical order in SQL equals chronological order.
//! Structured fields (interests, profile, resource extras) are compact JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use skillswap_core::{
  contact::Contact,
  conversation::{Conversation, Message, Participants},
  resource::Resource,
  user::User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_object(map: &Map<String, Value>) -> Result<String> {
  Ok(serde_json::to_string(map)?)
}

pub fn decode_object(s: &str) -> Result<Map<String, Value>> {
  match serde_json::from_str(s)? {
    Value::Object(map) => Ok(map),
    other => Err(Error::Corrupt(format!("expected a JSON object, got {other}"))),
  }
}

pub fn encode_strings(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_strings(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "user_id, first_name, last_name, email, password_hash,
  interests, skill_level, profile, created_at, updated_at";

/// Raw strings read directly from a `users` row, in [`USER_COLUMNS`] order.
pub struct RawUser {
  pub user_id:       String,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub password_hash: String,
  pub interests:     String,
  pub skill_level:   String,
  pub profile:       String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      first_name:    row.get(1)?,
      last_name:     row.get(2)?,
      email:         row.get(3)?,
      password_hash: row.get(4)?,
      interests:     row.get(5)?,
      skill_level:   row.get(6)?,
      profile:       row.get(7)?,
      created_at:    row.get(8)?,
      updated_at:    row.get(9)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            self.user_id,
      first_name:    self.first_name,
      last_name:     self.last_name,
      email:         self.email,
      password_hash: self.password_hash,
      interests:     decode_strings(&self.interests)?,
      skill_level:   self.skill_level,
      profile:       decode_object(&self.profile)?,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

pub const CONVERSATION_COLUMNS: &str =
  "conversation_id, participant_a, participant_b, created_at, updated_at";

/// A `conversations` row plus its `messages` rows in `seq` order.
pub struct RawConversation {
  pub conversation_id: String,
  pub participant_a:   String,
  pub participant_b:   String,
  pub created_at:      String,
  pub updated_at:      String,
  pub messages:        Vec<RawMessage>,
}

impl RawConversation {
  /// Reads the conversation columns only; `messages` is filled in by the
  /// caller.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      conversation_id: row.get(0)?,
      participant_a:   row.get(1)?,
      participant_b:   row.get(2)?,
      created_at:      row.get(3)?,
      updated_at:      row.get(4)?,
      messages:        Vec::new(),
    })
  }

  pub fn into_conversation(self) -> Result<Conversation> {
    let participants = Participants::canonical(&self.participant_a, &self.participant_b)
      .map_err(|e| Error::Corrupt(format!("conversation {}: {e}", self.conversation_id)))?;

    Ok(Conversation {
      id: self.conversation_id,
      participants,
      messages: self
        .messages
        .into_iter()
        .map(RawMessage::into_message)
        .collect::<Result<_>>()?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub const MESSAGE_COLUMNS: &str = "message_id, from_email, to_email, body, sent_at";

pub struct RawMessage {
  pub message_id: String,
  pub from_email: String,
  pub to_email:   String,
  pub body:       String,
  pub sent_at:    String,
}

impl RawMessage {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      message_id: row.get(0)?,
      from_email: row.get(1)?,
      to_email:   row.get(2)?,
      body:       row.get(3)?,
      sent_at:    row.get(4)?,
    })
  }

  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      id:        self.message_id,
      from:      self.from_email,
      to:        self.to_email,
      text:      self.body,
      timestamp: decode_dt(&self.sent_at)?,
    })
  }
}

pub const RESOURCE_COLUMNS: &str =
  "resource_id, title, category, owner_email, likes, extra, created_at, updated_at";

pub struct RawResource {
  pub resource_id: String,
  pub title:       String,
  pub category:    Option<String>,
  pub owner_email: Option<String>,
  pub likes:       i64,
  pub extra:       String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawResource {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      resource_id: row.get(0)?,
      title:       row.get(1)?,
      category:    row.get(2)?,
      owner_email: row.get(3)?,
      likes:       row.get(4)?,
      extra:       row.get(5)?,
      created_at:  row.get(6)?,
      updated_at:  row.get(7)?,
    })
  }

  pub fn into_resource(self) -> Result<Resource> {
    Ok(Resource {
      id:          self.resource_id,
      title:       self.title,
      category:    self.category,
      owner_email: self.owner_email,
      likes:       self.likes,
      extra:       decode_object(&self.extra)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

pub const CONTACT_COLUMNS: &str = "contact_id, owner_email, contact_email, name, created_at";

pub struct RawContact {
  pub contact_id:    String,
  pub owner_email:   String,
  pub contact_email: String,
  pub name:          String,
  pub created_at:    String,
}

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contact_id:    row.get(0)?,
      owner_email:   row.get(1)?,
      contact_email: row.get(2)?,
      name:          row.get(3)?,
      created_at:    row.get(4)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:            self.contact_id,
      owner_email:   self.owner_email,
      contact_email: self.contact_email,
      name:          self.name,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
