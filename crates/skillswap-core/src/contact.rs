use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entry in a user's contact list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub id:            String,
  #[serde(rename = "ownerEmail")]
  pub owner_email:   String,
  #[serde(rename = "contactEmail")]
  pub contact_email: String,
  pub name:          String,
  pub created_at:    DateTime<Utc>,
}
