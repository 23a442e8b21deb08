//! Resource board posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys owned by the board itself; anything else a client posts is kept in
/// [`Resource::extra`] and echoed back untouched.
pub const RESERVED_KEYS: &[&str] = &[
  "_id",
  "id",
  "title",
  "category",
  "ownerEmail",
  "likes",
  "created_at",
  "updated_at",
];

/// A post on the shared resources board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
  pub id:          String,
  pub title:       String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category:    Option<String>,
  #[serde(rename = "ownerEmail", skip_serializing_if = "Option::is_none")]
  pub owner_email: Option<String>,
  pub likes:       i64,
  /// Client-supplied fields with no meaning to the server (description,
  /// link, tags, …), flattened into the top-level object on the wire.
  #[serde(flatten)]
  pub extra:       Map<String, Value>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}
