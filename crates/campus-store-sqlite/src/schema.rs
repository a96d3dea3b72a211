//! SQL schema for the Campus SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Table names match [`ResourceKind::collection`](campus_core::ResourceKind::collection).
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS jobs (
    id          TEXT PRIMARY KEY,
    owner_uni   TEXT NOT NULL,
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned, immutable
    updated_at  TEXT NOT NULL,   -- RFC 3339 UTC; refreshed on every update
    body_json   TEXT NOT NULL    -- client-writable fields as JSON
);

CREATE TABLE IF NOT EXISTS pets (
    id          TEXT PRIMARY KEY,
    owner_uni   TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    body_json   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS jobs_owner_idx ON jobs(owner_uni);
CREATE INDEX IF NOT EXISTS pets_owner_idx ON pets(owner_uni);

PRAGMA user_version = 1;
";
