//! Registration, login and profile storage.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::{
  Error, Result, clock,
  identity::{self, hash_password, verify_password},
  store::{DocumentStore, Insert},
  user::User,
};

/// Raw registration payload. Every field is required; blank counts as missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
  #[serde(rename = "firstName")]
  pub first_name:  Option<String>,
  #[serde(rename = "lastName")]
  pub last_name:   Option<String>,
  pub email:       Option<String>,
  pub password:    Option<String>,
  pub interests:   Option<Vec<String>>,
  #[serde(rename = "skillLevel")]
  pub skill_level: Option<String>,
}

impl Registration {
  /// Names of required fields that are absent or blank, in form order.
  pub fn missing_fields(&self) -> Vec<&'static str> {
    let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());

    let mut missing = Vec::new();
    if blank(&self.first_name) {
      missing.push("firstName");
    }
    if blank(&self.last_name) {
      missing.push("lastName");
    }
    if blank(&self.email) {
      missing.push("email");
    }
    if self.password.as_deref().is_none_or(str::is_empty) {
      missing.push("password");
    }
    if self.interests.as_ref().is_none_or(Vec::is_empty) {
      missing.push("interests");
    }
    if blank(&self.skill_level) {
      missing.push("skillLevel");
    }
    missing
  }
}

/// Create an account. Fails with [`Error::Conflict`] if the email is taken.
pub async fn register<S>(store: &S, input: Registration) -> Result<User>
where
  S: DocumentStore,
{
  let missing = input.missing_fields();
  if !missing.is_empty() {
    return Err(Error::MissingFields(missing));
  }

  let email = identity::normalize_email(input.email.as_deref().unwrap_or_default());
  if store
    .find_user(&email)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .is_some()
  {
    return Err(Error::Conflict("email already registered".into()));
  }

  let now = clock::now();
  let user = User {
    id:            identity::new_token(),
    first_name:    input.first_name.unwrap_or_default().trim().to_owned(),
    last_name:     input.last_name.unwrap_or_default().trim().to_owned(),
    email,
    password_hash: hash_password(input.password.as_deref().unwrap_or_default())?,
    interests:     input.interests.unwrap_or_default(),
    skill_level:   input.skill_level.unwrap_or_default().trim().to_owned(),
    profile:       Map::new(),
    created_at:    now,
    updated_at:    now,
  };

  match store
    .insert_user(&user)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
  {
    Insert::Created => {
      info!(email = %user.email, "registered user");
      Ok(user)
    }
    Insert::AlreadyExists => Err(Error::Conflict("email already registered".into())),
  }
}

/// Check credentials and return the matching user.
///
/// Unknown emails and wrong passwords are indistinguishable to the caller.
pub async fn login<S>(store: &S, email: &str, password: &str) -> Result<User>
where
  S: DocumentStore,
{
  let email = identity::normalize_email(email);
  if email.is_empty() || password.is_empty() {
    return Err(Error::Validation("email and password required".into()));
  }

  let user = store
    .find_user(&email)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::InvalidCredentials)?;

  if !verify_password(password, &user.password_hash) {
    return Err(Error::InvalidCredentials);
  }
  Ok(user)
}

/// Look up a user by (un-normalised) email. `Ok(None)` if there is none.
pub async fn find_user<S>(store: &S, email: &str) -> Result<Option<User>>
where
  S: DocumentStore,
{
  let email = identity::normalize_email(email);
  if email.is_empty() {
    return Err(Error::Validation("email required".into()));
  }
  store
    .find_user(&email)
    .await
    .map_err(|e| Error::Store(Box::new(e)))
}

/// The stored profile object for `email`.
pub async fn get_profile<S>(store: &S, email: &str) -> Result<Map<String, Value>>
where
  S: DocumentStore,
{
  find_user(store, email)
    .await?
    .map(|u| u.profile)
    .ok_or_else(|| Error::NotFound("user not found".into()))
}

/// Replace the profile object for `email`.
///
/// The stored object gains an `updatedAt` timestamp. Never creates a user.
pub async fn save_profile<S>(store: &S, email: &str, profile: Option<Value>) -> Result<()>
where
  S: DocumentStore,
{
  let email = identity::normalize_email(email);
  if email.is_empty() {
    return Err(Error::Validation("email required".into()));
  }
  let Some(Value::Object(mut profile)) = profile else {
    return Err(Error::Validation("profile must be an object".into()));
  };

  let now = clock::now();
  profile.insert("updatedAt".into(), Value::String(now.to_rfc3339()));

  let matched = store
    .update_profile(&email, &profile, now)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  if !matched {
    return Err(Error::NotFound("user not found".into()));
  }
  Ok(())
}
