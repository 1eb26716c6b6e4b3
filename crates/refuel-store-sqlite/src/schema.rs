//! SQL schema for the token registry.

/// Idempotent DDL run on every open.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS device_tokens (
    key         TEXT NOT NULL,   -- customer email, as submitted
    value       TEXT NOT NULL,   -- opaque device token
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC
    UNIQUE (key, value)
);

CREATE INDEX IF NOT EXISTS device_tokens_key_idx ON device_tokens(key);

PRAGMA user_version = 1;
";
