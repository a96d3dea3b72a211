//! ETag computation for stored records.
//!
//! An ETag is a SHA-256 hash over the record id and its `updated_at`. Every
//! successful update advances `updated_at` by at least one microsecond, so
//! every update yields a new ETag.

use campus_core::ServerFields;
use sha2::{Digest, Sha256};

/// Compute a quoted strong ETag for the record owning `server`.
pub fn compute_etag(server: &ServerFields) -> String {
  let mut hasher = Sha256::new();
  hasher.update(server.id.as_bytes());
  hasher.update(server.updated_at.timestamp_micros().to_le_bytes());
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Whether an `If-Match` header value matches `current`.
///
/// Accepts `*`, quoted and bare forms, and comma-separated lists.
pub fn if_match_satisfied(header: &str, current: &str) -> bool {
  let current = strip_etag_quotes(current);
  header
    .split(',')
    .map(str::trim)
    .any(|candidate| candidate == "*" || strip_etag_quotes(candidate) == current)
}

fn strip_etag_quotes(s: &str) -> &str { s.trim_matches('"') }
