//! [`SqliteStore`] — the SQLite implementation of [`ResourceStore`].

use std::path::Path;

use campus_core::{
  Record, Resource, Uni,
  store::{Replaced, ResourceStore},
};
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{RawRecord, encode_body, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Campus resource store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ResourceStore impl ──────────────────────────────────────────────────────

impl<R: Resource> ResourceStore<R> for SqliteStore {
  type Error = Error;

  async fn create(&self, record: Record<R>) -> Result<Record<R>> {
    let table      = R::KIND.collection();
    let id_str     = encode_uuid(record.server.id);
    let owner      = record.body.owner_uni().as_str().to_owned();
    let created_at = encode_dt(record.server.created_at);
    let updated_at = encode_dt(record.server.updated_at);
    let body_json  = encode_body(&record.body)?;

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!(
            "INSERT OR IGNORE INTO {table}
               (id, owner_uni, created_at, updated_at, body_json)
             VALUES (?1, ?2, ?3, ?4, ?5)"
          ),
          rusqlite::params![id_str, owner, created_at, updated_at, body_json],
        )?)
      })
      .await?;

    if inserted == 0 {
      return Err(Error::AlreadyExists {
        kind: R::KIND.as_str(),
        id:   record.server.id,
      });
    }
    Ok(record)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Record<R>>> {
    let table  = R::KIND.collection();
    let id_str = encode_uuid(id);

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM {table} WHERE id = ?1", RawRecord::COLUMNS),
            rusqlite::params![id_str],
            RawRecord::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRecord::into_record::<R>).transpose()
  }

  /// `created_at` is never rewritten; only the owner, `updated_at` and the
  /// body change. The returned record is re-read from the row.
  async fn replace(
    &self,
    id: Uuid,
    expected: DateTime<Utc>,
    record: Record<R>,
  ) -> Result<Replaced<R>> {
    let table      = R::KIND.collection();
    let id_str     = encode_uuid(id);
    let expected   = encode_dt(expected);
    let owner      = record.body.owner_uni().as_str().to_owned();
    let updated_at = encode_dt(record.server.updated_at);
    let body_json  = encode_body(&record.body)?;

    let (changed, raw): (usize, Option<RawRecord>) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          &format!(
            "UPDATE {table}
             SET owner_uni = ?2, updated_at = ?3, body_json = ?4
             WHERE id = ?1 AND updated_at = ?5"
          ),
          rusqlite::params![id_str, owner, updated_at, body_json, expected],
        )?;
        let raw = tx
          .query_row(
            &format!("SELECT {} FROM {table} WHERE id = ?1", RawRecord::COLUMNS),
            rusqlite::params![id_str],
            RawRecord::from_row,
          )
          .optional()?;
        tx.commit()?;
        Ok((changed, raw))
      })
      .await?;

    match (changed, raw) {
      (_, None) => Ok(Replaced::NotFound),
      (0, Some(_)) => Ok(Replaced::Stale),
      (_, Some(raw)) => Ok(Replaced::Updated(raw.into_record::<R>()?)),
    }
  }

  async fn list<'a>(&'a self, owner_uni: Option<&'a Uni>) -> Result<Vec<Record<R>>> {
    let table = R::KIND.collection();
    let owner = owner_uni.map(|u| u.as_str().to_owned());

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(owner) = owner {
          let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {table} WHERE owner_uni = ?1
             ORDER BY created_at, id",
            RawRecord::COLUMNS
          ))?;
          stmt
            .query_map(rusqlite::params![owner], RawRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {table} ORDER BY created_at, id",
            RawRecord::COLUMNS
          ))?;
          stmt
            .query_map([], RawRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record::<R>).collect()
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let table  = R::KIND.collection();
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("DELETE FROM {table} WHERE id = ?1"),
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }
}
