//! Router tests over an in-memory store.

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use serde_json::{Value, json};
use skillswap_core::bus::NEW_MESSAGE;
use skillswap_store_sqlite::SqliteStore;
use tokio::sync::mpsc;
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{
  AppState,
  realtime::hub::OUTBOX_CAPACITY,
  router,
  session::{DEFAULT_TTL, Sessions},
};

async fn make_state() -> AppState<SqliteStore> {
  AppState::new(
    SqliteStore::open_in_memory().await.unwrap(),
    Sessions::new("sid", DEFAULT_TTL),
  )
}

async fn call(
  state:   &AppState<SqliteStore>,
  method:  &str,
  uri:     &str,
  headers: Vec<(header::HeaderName, &str)>,
  body:    Option<Value>,
) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  for (k, v) in headers {
    builder = builder.header(k, v);
  }
  let req = match body {
    Some(json) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  router(state.clone()).oneshot(req).await.unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn registration(email: &str) -> Value {
  json!({
    "firstName":  "Ada",
    "lastName":   "Lovelace",
    "email":      email,
    "password":   "hunter22",
    "interests":  ["math"],
    "skillLevel": "expert",
  })
}

/// The `name=value` pair from a `Set-Cookie` header.
fn session_pair(resp: &Response) -> String {
  let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
  cookie.split(';').next().unwrap().to_owned()
}

// ── Liveness ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn root_reports_liveness() {
  let state = make_state().await;
  let resp = call(&state, "GET", "/", vec![], None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(json_body(resp).await["message"].is_string());
}

// ── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_sets_session_and_hides_password() {
  let state = make_state().await;
  let resp = call(&state, "POST", "/api/register", vec![], Some(registration("Ada@X.com"))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let cookie = session_pair(&resp);
  assert!(cookie.starts_with("sid="));
  let body = json_body(resp).await;
  assert_eq!(body["user"]["email"], "ada@x.com");
  assert!(body["user"].get("password").is_none());
  assert!(body["user"].get("password_hash").is_none());

  let me = call(&state, "GET", "/api/me", vec![(header::COOKIE, cookie.as_str())], None).await;
  assert_eq!(json_body(me).await["user"]["firstName"], "Ada");
}

#[tokio::test]
async fn register_reports_missing_fields() {
  let state = make_state().await;
  let resp = call(
    &state,
    "POST",
    "/api/register",
    vec![],
    Some(json!({ "email": "ada@x.com", "firstName": "Ada" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body = json_body(resp).await;
  assert_eq!(body["missing"], json!(["lastName", "password", "interests", "skillLevel"]));
}

#[tokio::test]
async fn register_duplicate_is_conflict() {
  let state = make_state().await;
  call(&state, "POST", "/api/register", vec![], Some(registration("ada@x.com"))).await;
  let resp = call(&state, "POST", "/api/register", vec![], Some(registration("ADA@x.com"))).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_logout_cycle() {
  let state = make_state().await;
  call(&state, "POST", "/api/register", vec![], Some(registration("ada@x.com"))).await;

  let bad = call(
    &state,
    "POST",
    "/api/login",
    vec![],
    Some(json!({ "email": "ada@x.com", "password": "wrong" })),
  )
  .await;
  assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);

  let missing = call(&state, "POST", "/api/login", vec![], Some(json!({}))).await;
  assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

  let ok = call(
    &state,
    "POST",
    "/api/login",
    vec![],
    Some(json!({ "email": "ada@x.com", "password": "hunter22" })),
  )
  .await;
  assert_eq!(ok.status(), StatusCode::OK);
  let cookie = session_pair(&ok);

  let out = call(&state, "POST", "/api/logout", vec![(header::COOKIE, cookie.as_str())], None).await;
  assert_eq!(out.status(), StatusCode::OK);
  assert!(session_pair(&out).ends_with('='));

  let me = call(&state, "GET", "/api/me", vec![(header::COOKIE, cookie.as_str())], None).await;
  assert_eq!(json_body(me).await["user"], Value::Null);
}

#[tokio::test]
async fn user_lookup_by_email() {
  let state = make_state().await;
  call(&state, "POST", "/api/register", vec![], Some(registration("ada@x.com"))).await;

  let found = call(&state, "GET", "/api/users/by-email?email=ADA%40x.com", vec![], None).await;
  let body = json_body(found).await;
  assert_eq!(body["user"]["name"], "Ada Lovelace");
  assert_eq!(body["user"]["email"], "ada@x.com");

  let absent = call(&state, "GET", "/api/users/by-email?email=bob%40x.com", vec![], None).await;
  assert_eq!(json_body(absent).await["user"], Value::Null);

  let blank = call(&state, "GET", "/api/users/by-email", vec![], None).await;
  assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_roundtrip() {
  let state = make_state().await;
  call(&state, "POST", "/api/register", vec![], Some(registration("ada@x.com"))).await;

  let saved = call(
    &state,
    "POST",
    "/api/profile",
    vec![],
    Some(json!({ "email": "ada@x.com", "profile": { "bio": "engines" } })),
  )
  .await;
  assert_eq!(saved.status(), StatusCode::OK);

  let got = call(&state, "GET", "/api/profile?email=ada%40x.com", vec![], None).await;
  let body = json_body(got).await;
  assert_eq!(body["profile"]["bio"], "engines");
  assert!(body["profile"]["updatedAt"].is_string());

  let bad = call(
    &state,
    "POST",
    "/api/profile",
    vec![],
    Some(json!({ "email": "ada@x.com", "profile": "engines" })),
  )
  .await;
  assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

  let unknown = call(&state, "GET", "/api/profile?email=bob%40x.com", vec![], None).await;
  assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

// ── Board ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resources_create_list_and_like() {
  let state = make_state().await;

  let created = call(
    &state,
    "POST",
    "/api/resources",
    vec![],
    Some(json!({ "title": "Rust book", "category": "coding", "url": "https://x" })),
  )
  .await;
  assert_eq!(created.status(), StatusCode::CREATED);
  let resource = json_body(created).await;
  assert_eq!(resource["likes"], 0);
  assert_eq!(resource["url"], "https://x");
  let id = resource["id"].as_str().unwrap().to_owned();

  let liked = call(
    &state,
    "PUT",
    &format!("/api/resources/{id}"),
    vec![],
    Some(json!({ "likes": 3 })),
  )
  .await;
  assert_eq!(liked.status(), StatusCode::OK);
  assert_eq!(json_body(liked).await["likes"], 3);

  let listed = call(&state, "GET", "/api/resources?category=coding", vec![], None).await;
  assert_eq!(json_body(listed).await["resources"][0]["likes"], 3);

  let other = call(&state, "GET", "/api/resources?category=music", vec![], None).await;
  assert_eq!(json_body(other).await["resources"], json!([]));
}

#[tokio::test]
async fn resource_errors() {
  let state = make_state().await;

  let untitled = call(&state, "POST", "/api/resources", vec![], Some(json!({ "x": 1 }))).await;
  assert_eq!(untitled.status(), StatusCode::BAD_REQUEST);
  assert_eq!(json_body(untitled).await["error"], "title required");

  let missing = call(
    &state,
    "PUT",
    &format!("/api/resources/{}", Uuid::new_v4().simple()),
    vec![],
    Some(json!({ "likes": 1 })),
  )
  .await;
  assert_eq!(missing.status(), StatusCode::NOT_FOUND);

  let not_json = call(&state, "PUT", "/api/resources/abc", vec![], None).await;
  assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(not_json).await["error"].is_string());
}

#[tokio::test]
async fn contacts_add_and_list() {
  let state = make_state().await;

  let added = call(
    &state,
    "POST",
    "/api/contacts",
    vec![],
    Some(json!({ "ownerEmail": "ada@x.com", "contactEmail": "bob@x.com", "name": "Bob" })),
  )
  .await;
  assert_eq!(added.status(), StatusCode::CREATED);

  let listed = call(&state, "GET", "/api/contacts?email=ada%40x.com", vec![], None).await;
  let body = json_body(listed).await;
  assert_eq!(body["contacts"][0]["contactEmail"], "bob@x.com");

  let invalid = call(&state, "POST", "/api/contacts", vec![], Some(json!({ "name": "x" }))).await;
  assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

// ── Messaging ───────────────────────────────────────────────────────────────

async fn open_conversation(state: &AppState<SqliteStore>, a: &str, b: &str) -> (StatusCode, Value) {
  let resp = call(
    state,
    "POST",
    "/api/conversations",
    vec![],
    Some(json!({ "participants": [a, b] })),
  )
  .await;
  let status = resp.status();
  (status, json_body(resp).await["conversation"].clone())
}

#[tokio::test]
async fn conversation_is_created_once_per_pair() {
  let state = make_state().await;

  let (first_status, first) = open_conversation(&state, "a@x.com", "B@X.com ").await;
  assert_eq!(first_status, StatusCode::CREATED);
  assert_eq!(first["participants"], json!(["a@x.com", "b@x.com"]));

  let (second_status, second) = open_conversation(&state, "b@x.com", "a@x.com").await;
  assert_eq!(second_status, StatusCode::OK);
  assert_eq!(second["id"], first["id"]);

  let legacy = call(
    &state,
    "POST",
    "/api/messages/conversation",
    vec![],
    Some(json!({ "participants": ["a@x.com", "b@x.com"] })),
  )
  .await;
  assert_eq!(legacy.status(), StatusCode::OK);
  assert_eq!(json_body(legacy).await["conversation"]["id"], first["id"]);
}

#[tokio::test]
async fn conversation_requires_two_distinct_participants() {
  let state = make_state().await;
  for participants in [json!(["a@x.com"]), json!(["a@x.com", "A@x.com"]), json!([])] {
    let resp = call(
      &state,
      "POST",
      "/api/conversations",
      vec![],
      Some(json!({ "participants": participants })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }
}

#[tokio::test]
async fn send_and_list_messages() {
  let state = make_state().await;
  let (_, conv) = open_conversation(&state, "a@x.com", "b@x.com").await;
  let id = conv["id"].as_str().unwrap();

  let sent = call(
    &state,
    "POST",
    "/api/messages",
    vec![],
    Some(json!({ "conversationId": id, "from": "a@x.com", "to": "b@x.com", "text": " hi " })),
  )
  .await;
  assert_eq!(sent.status(), StatusCode::CREATED);
  let body = json_body(sent).await;
  assert_eq!(body["conversationId"], id);
  assert_eq!(body["message"]["text"], "hi");

  let legacy = call(
    &state,
    "POST",
    "/api/messages/send",
    vec![],
    Some(json!({ "conversationId": id, "from": "b@x.com", "to": "a@x.com", "text": "yo" })),
  )
  .await;
  assert_eq!(legacy.status(), StatusCode::CREATED);

  for uri in ["/api/conversations?email=b%40x.com", "/api/messages?email=b%40x.com"] {
    let listed = json_body(call(&state, "GET", uri, vec![], None).await).await;
    let texts: Vec<_> = listed["conversations"][0]["messages"]
      .as_array()
      .unwrap()
      .iter()
      .map(|m| m["text"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(texts, vec!["hi", "yo"]);
  }
}

#[tokio::test]
async fn send_errors_map_to_statuses() {
  let state = make_state().await;

  let unknown = call(
    &state,
    "POST",
    "/api/messages",
    vec![],
    Some(json!({ "conversationId": "nonexistent", "from": "a@x.com", "to": "b@x.com", "text": "hi" })),
  )
  .await;
  assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

  let blank = call(
    &state,
    "POST",
    "/api/messages",
    vec![],
    Some(json!({ "conversationId": "nonexistent", "from": "a@x.com", "to": "b@x.com", "text": "  " })),
  )
  .await;
  assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

  let no_email = call(&state, "GET", "/api/conversations", vec![], None).await;
  assert_eq!(no_email.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_query_and_path_are_json_bad_requests() {
  let state = make_state().await;

  let repeated = call(
    &state,
    "GET",
    "/api/conversations?email=a%40x.com&email=b%40x.com",
    vec![],
    None,
  )
  .await;
  assert_eq!(repeated.status(), StatusCode::BAD_REQUEST);
  assert_eq!(repeated.headers()[header::CONTENT_TYPE], "application/json");
  assert!(json_body(repeated).await["error"].is_string());

  let bad_path = call(
    &state,
    "PUT",
    "/api/resources/%FF",
    vec![],
    Some(json!({ "likes": 1 })),
  )
  .await;
  assert_eq!(bad_path.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(bad_path).await["error"].is_string());
}

#[tokio::test]
async fn rest_send_reaches_registered_sockets() {
  let state = make_state().await;
  let (_, conv) = open_conversation(&state, "a@x.com", "b@x.com").await;

  let (tx, mut rx) = mpsc::channel(OUTBOX_CAPACITY);
  state.hub.join("b@x.com", Uuid::new_v4(), tx);

  call(
    &state,
    "POST",
    "/api/messages",
    vec![],
    Some(json!({ "conversationId": conv["id"], "from": "a@x.com", "to": "b@x.com", "text": "ping" })),
  )
  .await;

  let event = rx.try_recv().unwrap();
  assert_eq!(event.event, NEW_MESSAGE);
  assert_eq!(event.data["message"]["text"], "ping");
}
