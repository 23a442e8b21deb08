//! [`SqliteStore`] — the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{ErrorCode, OptionalExtension as _};
use serde_json::{Map, Value};
use skillswap_core::{
  contact::Contact,
  conversation::{Conversation, Message, Participants},
  resource::Resource,
  store::{DocumentStore, Insert},
  user::User,
};
use tracing::debug;

use crate::{
  Result,
  encode::{
    CONTACT_COLUMNS, CONVERSATION_COLUMNS, MESSAGE_COLUMNS, RESOURCE_COLUMNS, RawContact,
    RawConversation, RawMessage, RawResource, RawUser, USER_COLUMNS, encode_dt, encode_object,
    encode_strings,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A SkillSwap document store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load conversations matching `filter` (a `WHERE …` clause over the
  /// `conversations` table, with one text parameter), messages included.
  async fn select_conversations(
    &self,
    filter: &'static str,
    param: String,
  ) -> Result<Vec<Conversation>> {
    let raws: Vec<RawConversation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONVERSATION_COLUMNS} FROM conversations {filter}"
        ))?;
        let mut rows = stmt
          .query_map([&param], RawConversation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        for raw in &mut rows {
          raw.messages = load_messages(conn, &raw.conversation_id)?;
        }
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawConversation::into_conversation).collect()
  }
}

/// All messages of one conversation, in send order.
fn load_messages(
  conn: &rusqlite::Connection,
  conversation_id: &str,
) -> rusqlite::Result<Vec<RawMessage>> {
  let mut stmt = conn.prepare_cached(&format!(
    "SELECT {MESSAGE_COLUMNS} FROM messages WHERE conversation_id = ?1 ORDER BY seq"
  ))?;
  stmt
    .query_map([conversation_id], RawMessage::from_row)?
    .collect()
}

/// Map a uniqueness violation to [`Insert::AlreadyExists`].
fn insert_outcome(result: rusqlite::Result<usize>) -> tokio_rusqlite::Result<Insert> {
  match result {
    Ok(_) => Ok(Insert::Created),
    Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
      Ok(Insert::AlreadyExists)
    }
    Err(e) => Err(e.into()),
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn insert_user(&self, user: &User) -> Result<Insert> {
    let user_id       = user.id.clone();
    let first_name    = user.first_name.clone();
    let last_name     = user.last_name.clone();
    let email         = user.email.clone();
    let password_hash = user.password_hash.clone();
    let interests     = encode_strings(&user.interests)?;
    let skill_level   = user.skill_level.clone();
    let profile       = encode_object(&user.profile)?;
    let created_at    = encode_dt(user.created_at);
    let updated_at    = encode_dt(user.updated_at);

    let outcome = self
      .conn
      .call(move |conn| {
        insert_outcome(conn.execute(
          "INSERT INTO users (
             user_id, first_name, last_name, email, password_hash,
             interests, skill_level, profile, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            user_id,
            first_name,
            last_name,
            email,
            password_hash,
            interests,
            skill_level,
            profile,
            created_at,
            updated_at,
          ],
        ))
      })
      .await?;
    Ok(outcome)
  }

  async fn find_user(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            [&email],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn update_profile(
    &self,
    email: &str,
    profile: &Map<String, Value>,
    at: DateTime<Utc>,
  ) -> Result<bool> {
    let email   = email.to_owned();
    let profile = encode_object(profile)?;
    let at_str  = encode_dt(at);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET profile = ?2, updated_at = ?3 WHERE email = ?1",
          rusqlite::params![email, profile, at_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  // ── Conversations ─────────────────────────────────────────────────────────

  async fn insert_conversation(&self, conversation: &Conversation) -> Result<Insert> {
    let id         = conversation.id.clone();
    let a          = conversation.participants.first().to_owned();
    let b          = conversation.participants.second().to_owned();
    let created_at = encode_dt(conversation.created_at);
    let updated_at = encode_dt(conversation.updated_at);
    let messages: Vec<(String, String, String, String, String)> = conversation
      .messages
      .iter()
      .map(|m| {
        (m.id.clone(), m.from.clone(), m.to.clone(), m.text.clone(), encode_dt(m.timestamp))
      })
      .collect();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome = insert_outcome(tx.execute(
          "INSERT INTO conversations (
             conversation_id, participant_a, participant_b, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id, a, b, created_at, updated_at],
        ))?;
        if outcome == Insert::AlreadyExists {
          return Ok(outcome);
        }
        for (message_id, from, to, body, sent_at) in messages {
          tx.execute(
            "INSERT INTO messages (message_id, conversation_id, from_email, to_email, body, sent_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![message_id, id, from, to, body, sent_at],
          )?;
        }
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    if outcome == Insert::AlreadyExists {
      debug!(
        participants = ?conversation.participants,
        "conversation insert hit unique participant pair"
      );
    }
    Ok(outcome)
  }

  async fn find_conversation(&self, id: &str) -> Result<Option<Conversation>> {
    let found = self
      .select_conversations("WHERE conversation_id = ?1", id.to_owned())
      .await?;
    Ok(found.into_iter().next())
  }

  async fn find_conversation_by_participants(
    &self,
    participants: &Participants,
  ) -> Result<Option<Conversation>> {
    let a = participants.first().to_owned();
    let b = participants.second().to_owned();

    let raw: Option<RawConversation> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!(
              "SELECT {CONVERSATION_COLUMNS} FROM conversations
               WHERE participant_a = ?1 AND participant_b = ?2"
            ),
            [&a, &b],
            RawConversation::from_row,
          )
          .optional()?;
        match raw {
          Some(mut raw) => {
            raw.messages = load_messages(conn, &raw.conversation_id)?;
            Ok(Some(raw))
          }
          None => Ok(None),
        }
      })
      .await?;

    raw.map(RawConversation::into_conversation).transpose()
  }

  async fn list_conversations(&self, email: &str) -> Result<Vec<Conversation>> {
    // rowid breaks ties between conversations touched in the same microsecond.
    self
      .select_conversations(
        "WHERE participant_a = ?1 OR participant_b = ?1
         ORDER BY updated_at DESC, rowid DESC",
        email.to_owned(),
      )
      .await
  }

  async fn append_message(&self, conversation_id: &str, message: &Message) -> Result<bool> {
    let conversation_id = conversation_id.to_owned();
    let message_id      = message.id.clone();
    let from            = message.from.clone();
    let to              = message.to.clone();
    let body            = message.text.clone();
    let sent_at         = encode_dt(message.timestamp);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // MAX keeps updated_at from moving backwards if the clock does.
        let matched = tx.execute(
          "UPDATE conversations SET updated_at = MAX(updated_at, ?2)
           WHERE conversation_id = ?1",
          rusqlite::params![conversation_id, sent_at],
        )?;
        if matched == 0 {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO messages (message_id, conversation_id, from_email, to_email, body, sent_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![message_id, conversation_id, from, to, body, sent_at],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await
      .map_err(Into::into)
  }

  // ── Resources ─────────────────────────────────────────────────────────────

  async fn insert_resource(&self, resource: &Resource) -> Result<()> {
    let id          = resource.id.clone();
    let title       = resource.title.clone();
    let category    = resource.category.clone();
    let owner_email = resource.owner_email.clone();
    let likes       = resource.likes;
    let extra       = encode_object(&resource.extra)?;
    let created_at  = encode_dt(resource.created_at);
    let updated_at  = encode_dt(resource.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO resources (
             resource_id, title, category, owner_email, likes, extra, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![id, title, category, owner_email, likes, extra, created_at, updated_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_resources(&self, category: Option<&str>) -> Result<Vec<Resource>> {
    let category = category.map(str::to_owned);

    let raws: Vec<RawResource> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RESOURCE_COLUMNS} FROM resources
           WHERE ?1 IS NULL OR category = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([&category], RawResource::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawResource::into_resource).collect()
  }

  async fn set_resource_likes(
    &self,
    id: &str,
    likes: i64,
    at: DateTime<Utc>,
  ) -> Result<Option<Resource>> {
    let id     = id.to_owned();
    let at_str = encode_dt(at);

    let raw: Option<RawResource> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE resources SET likes = ?2, updated_at = ?3 WHERE resource_id = ?1",
          rusqlite::params![id, likes, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(conn
          .query_row(
            &format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE resource_id = ?1"),
            [&id],
            RawResource::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawResource::into_resource).transpose()
  }

  // ── Contacts ──────────────────────────────────────────────────────────────

  async fn insert_contact(&self, contact: &Contact) -> Result<()> {
    let id            = contact.id.clone();
    let owner_email   = contact.owner_email.clone();
    let contact_email = contact.contact_email.clone();
    let name          = contact.name.clone();
    let created_at    = encode_dt(contact.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contacts (contact_id, owner_email, contact_email, name, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id, owner_email, contact_email, name, created_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_contacts(&self, owner_email: &str) -> Result<Vec<Contact>> {
    let owner_email = owner_email.to_owned();

    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts
           WHERE owner_email = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([&owner_email], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }
}
