//! The resources board and per-user contact lists.
//!
//! Both are plain owned records with no invariants beyond required fields.

use serde_json::{Map, Value};

use crate::{
  Error, Result, clock,
  contact::Contact,
  identity,
  resource::{RESERVED_KEYS, Resource},
  store::DocumentStore,
};

// ─── Resources ───────────────────────────────────────────────────────────────

/// All resources, newest first. A blank category means "every category".
pub async fn list_resources<S>(store: &S, category: Option<&str>) -> Result<Vec<Resource>>
where
  S: DocumentStore,
{
  let category = category.map(str::trim).filter(|c| !c.is_empty());
  store
    .list_resources(category)
    .await
    .map_err(|e| Error::Store(Box::new(e)))
}

/// Create a resource from an arbitrary JSON object.
///
/// `title` is required. `likes` defaults to zero. Unrecognised keys are kept
/// verbatim in [`Resource::extra`].
pub async fn create_resource<S>(store: &S, mut body: Map<String, Value>) -> Result<Resource>
where
  S: DocumentStore,
{
  let title = body
    .get("title")
    .and_then(Value::as_str)
    .map(str::trim)
    .unwrap_or_default()
    .to_owned();
  if title.is_empty() {
    return Err(Error::Validation("title required".into()));
  }

  let likes = match body.get("likes") {
    None | Some(Value::Null) => 0,
    Some(v) => parse_likes(v)?,
  };
  let category = optional_string(body.get("category"));
  let owner_email = optional_string(body.get("ownerEmail"))
    .map(|e| identity::normalize_email(&e))
    .filter(|e| !e.is_empty());

  body.retain(|k, _| !RESERVED_KEYS.contains(&k.as_str()));

  let now = clock::now();
  let resource = Resource {
    id: identity::new_token(),
    title,
    category,
    owner_email,
    likes,
    extra: body,
    created_at: now,
    updated_at: now,
  };

  store
    .insert_resource(&resource)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(resource)
}

/// Overwrite the like counter of resource `id`.
pub async fn set_likes<S>(store: &S, id: &str, likes: Option<&Value>) -> Result<Resource>
where
  S: DocumentStore,
{
  let likes = match likes {
    None => return Err(Error::Validation("likes required".into())),
    Some(v) => parse_likes(v)?,
  };

  store
    .set_resource_likes(id.trim(), likes, clock::now())
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or_else(|| Error::NotFound("resource not found".into()))
}

/// Accept integers, floats (truncated) and numeric strings.
fn parse_likes(value: &Value) -> Result<i64> {
  let parsed = match value {
    Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
    Value::String(s) => s.trim().parse::<i64>().ok(),
    Value::Bool(b) => Some(i64::from(*b)),
    _ => None,
  };
  parsed.ok_or_else(|| Error::Validation("likes must be a number".into()))
}

fn optional_string(value: Option<&Value>) -> Option<String> {
  value
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

// ─── Contacts ────────────────────────────────────────────────────────────────

/// Add `contact_email` to `owner_email`'s contact list.
pub async fn add_contact<S>(
  store: &S,
  owner_email: &str,
  contact_email: &str,
  name: &str,
) -> Result<Contact>
where
  S: DocumentStore,
{
  let owner_email = identity::normalize_email(owner_email);
  let contact_email = identity::normalize_email(contact_email);
  if owner_email.is_empty() || contact_email.is_empty() {
    return Err(Error::Validation("ownerEmail and contactEmail required".into()));
  }

  let contact = Contact {
    id: identity::new_token(),
    owner_email,
    contact_email,
    name: name.trim().to_owned(),
    created_at: clock::now(),
  };
  store
    .insert_contact(&contact)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  Ok(contact)
}

/// `owner_email`'s contacts, newest first.
pub async fn list_contacts<S>(store: &S, owner_email: &str) -> Result<Vec<Contact>>
where
  S: DocumentStore,
{
  let owner_email = identity::normalize_email(owner_email);
  if owner_email.is_empty() {
    return Err(Error::Validation("email is required".into()));
  }
  store
    .list_contacts(&owner_email)
    .await
    .map_err(|e| Error::Store(Box::new(e)))
}
