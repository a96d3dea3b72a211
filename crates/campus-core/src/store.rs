//! The `ResourceStore` trait — the persistence collaborator.
//!
//! The schema layer never calls a store; it produces [`Record`]s that the
//! caller hands to one. Backends (e.g. `campus-store-sqlite`) implement this
//! trait once per resource kind, or generically over every [`Resource`].
//! `replace` is a compare-and-swap on `updated_at`; a backend must perform
//! the comparison and the write atomically.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  resource::{Record, Resource},
  uni::Uni,
};

/// Abstraction over storage for records of kind `R`.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ResourceStore<R: Resource>: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a freshly assigned record. Returns the stored record.
  fn create(
    &self,
    record: Record<R>,
  ) -> impl Future<Output = Result<Record<R>, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Record<R>>, Self::Error>> + Send + '_;

  /// Overwrite the record stored under `id`, but only if its stored
  /// `updated_at` still equals `expected`. The check and the write are one
  /// atomic step. `created_at` is never rewritten.
  fn replace(
    &self,
    id: Uuid,
    expected: DateTime<Utc>,
    record: Record<R>,
  ) -> impl Future<Output = Result<Replaced<R>, Self::Error>> + Send + '_;

  /// List records, oldest first, optionally restricted to one owner.
  fn list<'a>(
    &'a self,
    owner_uni: Option<&'a Uni>,
  ) -> impl Future<Output = Result<Vec<Record<R>>, Self::Error>> + Send + 'a;

  /// Remove a record. Returns `false` if there was nothing to remove.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

/// Outcome of [`ResourceStore::replace`].
#[derive(Debug, Clone, PartialEq)]
pub enum Replaced<R> {
  /// The write happened; holds the record as now stored.
  Updated(Record<R>),
  NotFound,
  /// The record changed since `expected` was read; nothing was written.
  Stale,
}
