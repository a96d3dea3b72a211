//! Handlers for the resource collections, mounted once per kind.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/jobs`, `/pets` | Optional `?owner_uni=` |
//! | `POST`   | `/jobs`, `/pets` | Body: Create shape; returns 201 + Read shape |
//! | `GET`    | `/jobs/{id}`, `/pets/{id}` | Read shape + `ETag`; 404 if not found |
//! | `PATCH`  | `/jobs/{id}`, `/pets/{id}` | Body: Update shape; honours `If-Match` |
//! | `DELETE` | `/jobs/{id}`, `/pets/{id}` | 204, or 404 if not found |
//! | `GET`    | `/jobs/schema`, `/pets/schema` | JSON Schema of the Read shape |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use campus_core::{
  Record, Resource, Schema,
  store::{Replaced, ResourceStore},
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
  error::ApiError,
  etag::{compute_etag, if_match_satisfied},
};

// ─── State ────────────────────────────────────────────────────────────────────

/// Per-kind handler state: the shared store and that kind's schema.
pub struct ResourceState<S, R> {
  pub store:  Arc<S>,
  pub schema: Schema<R>,
}

impl<S, R> Clone for ResourceState<S, R> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      schema: self.schema.clone(),
    }
  }
}

/// How often `update` re-reads after losing a race to another writer.
const MAX_UPDATE_ATTEMPTS: usize = 3;

fn not_found<R: Resource>(id: Uuid) -> ApiError {
  ApiError::NotFound(format!("{} {id} not found", R::KIND.as_str()))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub owner_uni: Option<String>,
}

/// `GET /<kind>s[?owner_uni=<uni>]`
pub async fn list<S, R>(
  State(state): State<ResourceState<S, R>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Record<R>>>, ApiError>
where
  S: ResourceStore<R> + 'static,
  R: Resource,
{
  let owner = match params.owner_uni.as_deref() {
    Some(text) => Some(state.schema.parse_uni(text).ok_or_else(|| {
      ApiError::BadRequest(format!("invalid owner_uni {text:?}"))
    })?),
    None => None,
  };

  let records = state
    .store
    .list(owner.as_ref())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /<kind>s` — returns 201 + the stored record.
pub async fn create<S, R>(
  State(state): State<ResourceState<S, R>>,
  payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResourceStore<R> + 'static,
  R: Resource,
{
  let Json(payload) = payload?;
  let record = state.schema.create(&payload)?;
  let stored = state.store.create(record).await.map_err(ApiError::store)?;

  tracing::info!(kind = R::KIND.as_str(), id = %stored.server.id, "created");
  let etag = compute_etag(&stored.server);
  Ok((StatusCode::CREATED, [(header::ETAG, etag)], Json(stored)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /<kind>s/{id}`
pub async fn get_one<S, R>(
  State(state): State<ResourceState<S, R>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResourceStore<R> + 'static,
  R: Resource,
{
  let record = state
    .store
    .get(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found::<R>(id))?;
  let etag = compute_etag(&record.server);
  Ok(([(header::ETAG, etag)], Json(record)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /<kind>s/{id}` — merge-patch; `{}` only refreshes `updated_at`.
///
/// With `If-Match`, the update is refused with 412 unless the header matches
/// the ETag of the version being replaced. The write is conditional on that
/// version still being current; if another writer got there first the record
/// is re-read and the patch re-applied.
pub async fn update<S, R>(
  State(state): State<ResourceState<S, R>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
  payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResourceStore<R> + 'static,
  R: Resource,
{
  let Json(payload) = payload?;
  let patch = state.schema.validate_update(&payload)?;
  let if_match = headers
    .get(header::IF_MATCH)
    .and_then(|v| v.to_str().ok());

  for _ in 0..MAX_UPDATE_ATTEMPTS {
    let stored = state
      .store
      .get(id)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| not_found::<R>(id))?;

    if let Some(if_match) = if_match
      && !if_match_satisfied(if_match, &compute_etag(&stored.server))
    {
      return Err(ApiError::PreconditionFailed);
    }

    let merged = state.schema.apply_patch(&stored, &patch)?;
    let outcome = state
      .store
      .replace(id, stored.server.updated_at, merged)
      .await
      .map_err(ApiError::store)?;

    match outcome {
      Replaced::Updated(replaced) => {
        tracing::info!(
          kind = R::KIND.as_str(),
          %id,
          fields = patch.patch().len(),
          "updated"
        );
        let etag = compute_etag(&replaced.server);
        return Ok(([(header::ETAG, etag)], Json(replaced)));
      }
      Replaced::NotFound => return Err(not_found::<R>(id)),
      Replaced::Stale => {
        tracing::debug!(
          kind = R::KIND.as_str(),
          %id,
          "lost update race, retrying"
        );
      }
    }
  }

  Err(ApiError::Conflict(format!(
    "{} {id} is being modified concurrently",
    R::KIND.as_str()
  )))
}

// ─── Schema document ──────────────────────────────────────────────────────────

/// `GET /<kind>s/schema` — field types, descriptions, and examples.
pub async fn schema<R: Resource>() -> Json<Value> {
  Json(R::constraints().document())
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /<kind>s/{id}`
pub async fn delete_one<S, R>(
  State(state): State<ResourceState<S, R>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ResourceStore<R> + 'static,
  R: Resource,
{
  let deleted = state.store.delete(id).await.map_err(ApiError::store)?;
  if !deleted {
    return Err(not_found::<R>(id));
  }
  tracing::info!(kind = R::KIND.as_str(), %id, "deleted");
  Ok(StatusCode::NO_CONTENT)
}
