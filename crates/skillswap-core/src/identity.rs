//! Identity helpers: email normalisation, password hashing and opaque tokens.
//!
//! All functions here are pure apart from drawing randomness for salts and
//! tokens.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;
use uuid::Uuid;

use crate::{Error, Result};

/// Trim surrounding whitespace and lowercase.
///
/// An empty result means "missing"; callers decide whether that is an error.
pub fn normalize_email(raw: &str) -> String { raw.trim().to_lowercase() }

/// Hash `plain` into an argon2id PHC string (`$argon2id$v=19$…`).
pub fn hash_password(plain: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(plain.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Hashing(e.to_string()))
}

/// Check `plain` against a PHC string produced by [`hash_password`].
///
/// A stored hash that cannot be parsed never verifies.
pub fn verify_password(plain: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(plain.as_bytes(), &parsed)
    .is_ok()
}

/// A fresh opaque identifier: 32 lowercase hex characters.
pub fn new_token() -> String { Uuid::new_v4().simple().to_string() }
