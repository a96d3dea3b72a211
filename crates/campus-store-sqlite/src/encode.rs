//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (nanosecond
//! precision, `Z` suffix) so that lexical order is chronological. UUIDs are
//! stored as hyphenated lowercase strings. Bodies are compact JSON.

use campus_core::{Record, Resource, ServerFields};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Body ─────────────────────────────────────────────────────────────────────

pub fn encode_body<R: Resource>(body: &R) -> Result<String> {
  Ok(serde_json::to_string(body)?)
}

// ─── Row ──────────────────────────────────────────────────────────────────────

/// Raw strings read directly from a resource table row.
pub struct RawRecord {
  pub id:         String,
  pub created_at: String,
  pub updated_at: String,
  pub body_json:  String,
}

impl RawRecord {
  /// Column order expected by [`RawRecord::from_row`].
  pub const COLUMNS: &'static str = "id, created_at, updated_at, body_json";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      created_at: row.get(1)?,
      updated_at: row.get(2)?,
      body_json:  row.get(3)?,
    })
  }

  pub fn into_record<R: Resource>(self) -> Result<Record<R>> {
    Ok(Record {
      server: ServerFields {
        id:         decode_uuid(&self.id)?,
        created_at: decode_dt(&self.created_at)?,
        updated_at: decode_dt(&self.updated_at)?,
      },
      body:   serde_json::from_str(&self.body_json)?,
    })
  }
}
