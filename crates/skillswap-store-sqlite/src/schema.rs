//! SQL schema for the SkillSwap SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    email         TEXT PRIMARY KEY,      -- normalised
    user_id       TEXT NOT NULL UNIQUE,  -- opaque public id
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    password_hash TEXT NOT NULL,         -- argon2 PHC string
    interests     TEXT NOT NULL DEFAULT '[]',
    skill_level   TEXT NOT NULL,
    profile       TEXT NOT NULL DEFAULT '{}',
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

-- One row per unordered pair: participant_a < participant_b always.
CREATE TABLE IF NOT EXISTS conversations (
    conversation_id TEXT PRIMARY KEY,
    participant_a   TEXT NOT NULL,
    participant_b   TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE (participant_a, participant_b),
    CHECK  (participant_a < participant_b)
);

-- Messages are strictly append-only; seq gives send order.
CREATE TABLE IF NOT EXISTS messages (
    seq             INTEGER PRIMARY KEY AUTOINCREMENT,
    message_id      TEXT NOT NULL,
    conversation_id TEXT NOT NULL REFERENCES conversations(conversation_id),
    from_email      TEXT NOT NULL,
    to_email        TEXT NOT NULL,
    body            TEXT NOT NULL,
    sent_at         TEXT NOT NULL,
    UNIQUE (conversation_id, message_id)
);

CREATE TABLE IF NOT EXISTS resources (
    resource_id TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    category    TEXT,
    owner_email TEXT,
    likes       INTEGER NOT NULL DEFAULT 0,
    extra       TEXT NOT NULL DEFAULT '{}',  -- client-supplied fields
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contacts (
    contact_id    TEXT PRIMARY KEY,
    owner_email   TEXT NOT NULL,
    contact_email TEXT NOT NULL,
    name          TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS conversations_b_idx       ON conversations(participant_b);
CREATE INDEX IF NOT EXISTS conversations_updated_idx ON conversations(updated_at);
CREATE INDEX IF NOT EXISTS messages_conversation_idx ON messages(conversation_id, seq);
CREATE INDEX IF NOT EXISTS resources_category_idx    ON resources(category);
CREATE INDEX IF NOT EXISTS contacts_owner_idx        ON contacts(owner_email);

PRAGMA user_version = 1;
";
