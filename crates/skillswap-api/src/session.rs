//! Cookie sessions.
//!
//! A session is an opaque random token mapped to the normalised email it was
//! issued for. Sessions expire after a fixed lifetime. The table lives in
//! memory only, so every session also ends when the process restarts.

use std::{
  collections::HashMap,
  time::{Duration, Instant},
};

use axum::http::{HeaderMap, header};
use rand_core::{OsRng, RngCore};
use tokio::sync::RwLock;
use tracing::debug;

/// Default session lifetime: 31 days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(31 * 24 * 60 * 60);

#[derive(Debug)]
struct Entry {
  email:     String,
  issued_at: Instant,
}

/// In-memory session table plus the name of the cookie that carries tokens.
#[derive(Debug)]
pub struct Sessions {
  cookie: String,
  ttl:    Duration,
  table:  RwLock<HashMap<String, Entry>>,
}

impl Sessions {
  pub fn new(cookie: impl Into<String>, ttl: Duration) -> Self {
    Self { cookie: cookie.into(), ttl, table: RwLock::new(HashMap::new()) }
  }

  /// Start a session for `email` and return its token. Expired sessions are
  /// swept on every issue.
  pub async fn create(&self, email: &str) -> String {
    let token = new_session_token();
    let now = Instant::now();

    let mut table = self.table.write().await;
    let before = table.len();
    table.retain(|_, entry| now.duration_since(entry.issued_at) < self.ttl);
    if table.len() < before {
      debug!(evicted = before - table.len(), "swept expired sessions");
    }
    table.insert(token.clone(), Entry { email: email.to_owned(), issued_at: now });
    token
  }

  /// The email whose live session cookie is present in `headers`, if any.
  /// An expired session is evicted and resolves to nobody.
  pub async fn resolve(&self, headers: &HeaderMap) -> Option<String> {
    let token = self.token_from(headers)?;
    {
      let table = self.table.read().await;
      let entry = table.get(&token)?;
      if !self.expired(entry) {
        return Some(entry.email.clone());
      }
    }
    self.table.write().await.remove(&token);
    None
  }

  /// End the session named by `headers`. Returns `false` if there was none.
  pub async fn destroy(&self, headers: &HeaderMap) -> bool {
    match self.token_from(headers) {
      Some(token) => self.table.write().await.remove(&token).is_some(),
      None => false,
    }
  }

  /// `Set-Cookie` value that installs `token` for the session lifetime.
  pub fn set_cookie(&self, token: &str) -> String {
    format!(
      "{}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
      self.cookie,
      self.ttl.as_secs()
    )
  }

  /// `Set-Cookie` value that removes the session cookie.
  pub fn clear_cookie(&self) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", self.cookie)
  }

  fn expired(&self, entry: &Entry) -> bool { entry.issued_at.elapsed() >= self.ttl }

  fn token_from(&self, headers: &HeaderMap) -> Option<String> {
    headers
      .get_all(header::COOKIE)
      .iter()
      .filter_map(|v| v.to_str().ok())
      .flat_map(|v| v.split(';'))
      .filter_map(|pair| pair.trim().split_once('='))
      .find(|(name, _)| *name == self.cookie)
      .map(|(_, value)| value.to_owned())
      .filter(|value| !value.is_empty())
  }

  #[cfg(test)]
  async fn len(&self) -> usize { self.table.read().await.len() }
}

/// 32 random bytes from the OS, hex-encoded.
fn new_session_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn cookie_headers(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
    headers
  }

  #[tokio::test]
  async fn create_resolve_destroy() {
    let sessions = Sessions::new("sid", DEFAULT_TTL);
    let token = sessions.create("ada@x.com").await;
    assert_eq!(token.len(), 64);

    let headers = cookie_headers(&format!("theme=dark; sid={token}"));
    assert_eq!(sessions.resolve(&headers).await.as_deref(), Some("ada@x.com"));

    assert!(sessions.destroy(&headers).await);
    assert!(sessions.resolve(&headers).await.is_none());
    assert!(!sessions.destroy(&headers).await);
  }

  #[tokio::test]
  async fn unknown_or_missing_cookie_resolves_to_nobody() {
    let sessions = Sessions::new("sid", DEFAULT_TTL);
    sessions.create("ada@x.com").await;

    assert!(sessions.resolve(&HeaderMap::new()).await.is_none());
    assert!(sessions.resolve(&cookie_headers("sid=forged")).await.is_none());
    assert!(sessions.resolve(&cookie_headers("sid=")).await.is_none());
    assert!(sessions.resolve(&cookie_headers("other=1")).await.is_none());
  }

  #[test]
  fn cookie_attributes() {
    let sessions = Sessions::new("sid", DEFAULT_TTL);
    assert_eq!(
      sessions.set_cookie("abc"),
      "sid=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=2678400"
    );
    assert!(sessions.clear_cookie().contains("Max-Age=0"));
  }

  #[tokio::test]
  async fn expired_session_resolves_to_nobody_and_is_evicted() {
    let sessions = Sessions::new("sid", Duration::ZERO);
    let token = sessions.create("ada@x.com").await;
    let headers = cookie_headers(&format!("sid={token}"));

    assert!(sessions.resolve(&headers).await.is_none());
    assert_eq!(sessions.len().await, 0);
  }

  #[tokio::test]
  async fn issuing_sweeps_expired_sessions() {
    let sessions = Sessions::new("sid", Duration::ZERO);
    for _ in 0..5 {
      sessions.create("ada@x.com").await;
    }
    assert_eq!(sessions.len().await, 1);
  }

  #[test]
  fn tokens_are_distinct() {
    assert_ne!(new_session_token(), new_session_token());
  }
}
