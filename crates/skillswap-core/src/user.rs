//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A registered account, keyed by its normalised email.
///
/// The password hash is never serialised, so a `User` can be handed to any
/// transport as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  /// Opaque public identifier assigned at registration.
  pub id:            String,
  #[serde(rename = "firstName")]
  pub first_name:    String,
  #[serde(rename = "lastName")]
  pub last_name:     String,
  pub email:         String,
  #[serde(skip)]
  pub password_hash: String,
  pub interests:     Vec<String>,
  #[serde(rename = "skillLevel")]
  pub skill_level:   String,
  /// Free-form profile object, replaced wholesale on every profile save.
  pub profile:       Map<String, Value>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl User {
  /// "First Last", falling back to a name derived from the email's local
  /// part (`john.doe@x` becomes `John Doe`).
  pub fn display_name(&self) -> String {
    let full = format!("{} {}", self.first_name, self.last_name);
    let full = full.trim();
    if !full.is_empty() {
      return full.to_owned();
    }

    let local = self.email.split('@').next().unwrap_or_default();
    local
      .split('.')
      .filter(|w| !w.is_empty())
      .map(title_case)
      .collect::<Vec<_>>()
      .join(" ")
  }
}

fn title_case(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => {
      first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    }
    None => String::new(),
  }
}
