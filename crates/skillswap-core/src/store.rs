//! The `DocumentStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `skillswap-store-sqlite`). Services and transports depend on this
//! abstraction, not on any concrete backend.
//!
//! Each method is a single store operation: one find, one insert, or one
//! update-by-filter. Backends must make every method atomic on its own; no
//! operation spans more than one call.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::{
  contact::Contact,
  conversation::{Conversation, Message, Participants},
  resource::Resource,
  user::User,
};

/// Outcome of an insert into a collection with a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insert {
  Created,
  /// A record with the same unique key already exists; nothing was written.
  AlreadyExists,
}

/// Abstraction over a SkillSwap document store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. The email is the unique key.
  fn insert_user<'a>(
    &'a self,
    user: &'a User,
  ) -> impl Future<Output = Result<Insert, Self::Error>> + Send + 'a;

  /// Retrieve a user by normalised email. Returns `None` if not found.
  fn find_user<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Replace a user's profile object and bump `updated_at`.
  ///
  /// Returns `false` when no user matched; nothing is created.
  fn update_profile<'a>(
    &'a self,
    email: &'a str,
    profile: &'a Map<String, Value>,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Conversations ─────────────────────────────────────────────────────

  /// Persist a new conversation. The canonical participant pair is a unique
  /// key: a second conversation for the same pair reports
  /// [`Insert::AlreadyExists`].
  fn insert_conversation<'a>(
    &'a self,
    conversation: &'a Conversation,
  ) -> impl Future<Output = Result<Insert, Self::Error>> + Send + 'a;

  /// Retrieve a conversation, with its messages, by opaque id.
  fn find_conversation<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Conversation>, Self::Error>> + Send + 'a;

  /// Retrieve the conversation whose participants equal `participants`.
  fn find_conversation_by_participants<'a>(
    &'a self,
    participants: &'a Participants,
  ) -> impl Future<Output = Result<Option<Conversation>, Self::Error>> + Send + 'a;

  /// Every conversation `email` takes part in, most recently updated first.
  fn list_conversations<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Vec<Conversation>, Self::Error>> + Send + 'a;

  /// Append `message` to a conversation and set its `updated_at` to the
  /// message timestamp, as one atomic operation.
  ///
  /// Returns `false` when no conversation has that id; nothing is written.
  fn append_message<'a>(
    &'a self,
    conversation_id: &'a str,
    message: &'a Message,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Resources ─────────────────────────────────────────────────────────

  fn insert_resource<'a>(
    &'a self,
    resource: &'a Resource,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// All resources, optionally restricted to one category, newest first.
  fn list_resources<'a>(
    &'a self,
    category: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Resource>, Self::Error>> + Send + 'a;

  /// Overwrite a resource's like counter and return the updated record, or
  /// `None` if no resource has that id.
  fn set_resource_likes<'a>(
    &'a self,
    id: &'a str,
    likes: i64,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Resource>, Self::Error>> + Send + 'a;

  // ── Contacts ──────────────────────────────────────────────────────────

  fn insert_contact<'a>(
    &'a self,
    contact: &'a Contact,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Contacts owned by `owner_email`, newest first.
  fn list_contacts<'a>(
    &'a self,
    owner_email: &'a str,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + 'a;
}
