//! JSON REST API for campus jobs and pets.
//!
//! Exposes an axum [`Router`] backed by any store implementing
//! [`ResourceStore`] for both [`Job`] and [`Pet`]. Payload validation,
//! identity assignment, and merge-patching all happen in `campus-core`; the
//! handlers here only move records between the wire and the store.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = campus_api::api_router(Arc::new(store), Arc::new(ColumbiaUni));
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod etag;
pub mod health;
pub mod resources;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use campus_core::{
  Assigner, Resource, Schema, UniValidator, job::Job, pet::Pet,
  store::ResourceStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

use crate::resources::ResourceState;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, loaded from `config.toml` and `CAMPUS_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full API router: `/jobs`, `/pets`, their `/schema` documents,
/// and `/health`.
///
/// `unis` decides which owner UNIs are acceptable, both in payloads and in
/// the `owner_uni` list filter.
pub fn api_router<S>(store: Arc<S>, unis: Arc<dyn UniValidator>) -> Router<()>
where
  S: ResourceStore<Job> + ResourceStore<Pet> + 'static,
{
  let assigner = Assigner::system();
  let jobs = Schema::<Job>::new(Arc::clone(&unis), assigner.clone());
  let pets = Schema::<Pet>::new(unis, assigner);

  Router::new()
    .merge(resource_router(Arc::clone(&store), jobs))
    .merge(resource_router(store, pets))
    .merge(health::router())
    .layer(TraceLayer::new_for_http())
}

/// Mount the collection, member, and schema routes for one resource kind.
fn resource_router<S, R>(store: Arc<S>, schema: Schema<R>) -> Router<()>
where
  S: ResourceStore<R> + 'static,
  R: Resource,
{
  let collection = format!("/{}", R::KIND.collection());
  let member = format!("{collection}/{{id}}");
  let schema_doc = format!("{collection}/schema");

  Router::new()
    .route(
      &collection,
      get(resources::list::<S, R>).post(resources::create::<S, R>),
    )
    .route(
      &member,
      get(resources::get_one::<S, R>)
        .patch(resources::update::<S, R>)
        .delete(resources::delete_one::<S, R>),
    )
    .route(&schema_doc, get(resources::schema::<R>))
    .with_state(ResourceState { store, schema })
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
  };
  use std::sync::atomic::{AtomicUsize, Ordering};

  use campus_core::{ColumbiaUni, Record, Uni, store::Replaced};
  use campus_store_sqlite::SqliteStore;
  use chrono::{DateTime, Utc};
  use serde_json::{Value, json};
  use tokio::sync::Barrier;
  use tower::ServiceExt;
  use uuid::Uuid;

  use super::*;
  use crate::etag::compute_etag;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store), Arc::new(ColumbiaUni))
  }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    headers: Vec<(header::HeaderName, &str)>,
    body: Option<Value>,
  ) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = app
      .clone()
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
  }

  async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
      builder = builder.header(header::CONTENT_TYPE, ct);
    }
    let req = builder.body(Body::from(body.to_owned())).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  fn timestamp(v: &Value) -> DateTime<Utc> {
    v.as_str().unwrap().parse().unwrap()
  }

  fn pet_payload() -> Value {
    json!({
      "name": "Mochi",
      "species": "Cat",
      "breed": "Siamese",
      "weight": "12",
      "owner_uni": "abc1234",
    })
  }

  // ── Create ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_job_returns_201_with_nulls() {
    let app = app().await;
    let (status, headers, body) = send(
      &app,
      "POST",
      "/jobs",
      vec![],
      Some(json!({ "title": "Data Analyst", "owner_uni": "xy123" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(headers.contains_key(header::ETAG));
    assert_eq!(body["title"], "Data Analyst");
    assert_eq!(body["owner_uni"], "xy123");
    assert_eq!(body["description"], Value::Null);
    assert_eq!(body["start_date"], Value::Null);
    assert_eq!(body["end_date"], Value::Null);
    assert!(body["id"].as_str().unwrap().parse::<Uuid>().is_ok());
    assert_eq!(body["created_at"], body["updated_at"]);
  }

  #[tokio::test]
  async fn create_with_missing_title_lists_violations() {
    let app = app().await;
    let (status, _, body) = send(
      &app,
      "POST",
      "/jobs",
      vec![],
      Some(json!({ "owner_uni": "xy123", "start_date": "June" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
      body["violations"],
      json!([
        { "kind": "missing_or_invalid", "field": "title" },
        { "kind": "invalid_format", "field": "start_date" },
      ])
    );
  }

  #[tokio::test]
  async fn create_with_non_object_payload_is_rejected() {
    let app = app().await;
    let (status, _, body) =
      send(&app, "POST", "/pets", vec![], Some(json!(["Mochi"]))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"], json!([{ "kind": "not_an_object" }]));
  }

  // ── Read ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_round_trips_created_record() {
    let app = app().await;
    let (_, created_headers, created) =
      send(&app, "POST", "/pets", vec![], Some(pet_payload())).await;
    let id = created["id"].as_str().unwrap();

    let (status, headers, fetched) =
      send(&app, "GET", &format!("/pets/{id}"), vec![], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    assert_eq!(headers[header::ETAG], created_headers[header::ETAG]);
  }

  #[tokio::test]
  async fn get_unknown_id_is_404() {
    let app = app().await;
    let uri = format!("/jobs/{}", Uuid::new_v4());
    let (status, _, _) = send(&app, "GET", &uri, vec![], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn pet_id_is_not_a_job() {
    let app = app().await;
    let (_, _, created) =
      send(&app, "POST", "/pets", vec![], Some(pet_payload())).await;
    let uri = format!("/jobs/{}", created["id"].as_str().unwrap());
    let (status, _, _) = send(&app, "GET", &uri, vec![], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Update ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn patch_changes_only_supplied_fields() {
    let app = app().await;
    let (_, _, created) =
      send(&app, "POST", "/pets", vec![], Some(pet_payload())).await;
    let uri = format!("/pets/{}", created["id"].as_str().unwrap());

    let (status, _, updated) =
      send(&app, "PATCH", &uri, vec![], Some(json!({ "weight": "25" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["weight"], "25");
    for field in ["id", "name", "species", "breed", "owner_uni", "created_at"] {
      assert_eq!(updated[field], created[field], "{field}");
    }
    assert!(timestamp(&updated["updated_at"]) > timestamp(&created["updated_at"]));
  }

  #[tokio::test]
  async fn patch_null_clears_optional_field() {
    let app = app().await;
    let (_, _, created) =
      send(&app, "POST", "/pets", vec![], Some(pet_payload())).await;
    let uri = format!("/pets/{}", created["id"].as_str().unwrap());

    let (status, _, updated) =
      send(&app, "PATCH", &uri, vec![], Some(json!({ "breed": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["breed"], Value::Null);
  }

  #[tokio::test]
  async fn empty_patch_advances_updated_at() {
    let app = app().await;
    let (_, _, created) = send(
      &app,
      "POST",
      "/jobs",
      vec![],
      Some(json!({ "title": "Data Analyst", "owner_uni": "xy123" })),
    )
    .await;
    let uri = format!("/jobs/{}", created["id"].as_str().unwrap());

    let (status, _, updated) =
      send(&app, "PATCH", &uri, vec![], Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], created["title"]);
    assert!(timestamp(&updated["updated_at"]) > timestamp(&created["updated_at"]));
  }

  #[tokio::test]
  async fn patch_with_server_field_is_rejected() {
    let app = app().await;
    let (_, _, created) =
      send(&app, "POST", "/pets", vec![], Some(pet_payload())).await;
    let uri = format!("/pets/{}", created["id"].as_str().unwrap());

    let (status, _, body) = send(
      &app,
      "PATCH",
      &uri,
      vec![],
      Some(json!({ "id": Uuid::new_v4().to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
      body["violations"],
      json!([{ "kind": "unknown_field", "field": "id" }])
    );
  }

  #[tokio::test]
  async fn patch_unknown_id_is_404() {
    let app = app().await;
    let uri = format!("/pets/{}", Uuid::new_v4());
    let (status, _, _) =
      send(&app, "PATCH", &uri, vec![], Some(json!({ "weight": "25" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn if_match_guards_concurrent_updates() {
    let app = app().await;
    let (_, headers, created) =
      send(&app, "POST", "/pets", vec![], Some(pet_payload())).await;
    let uri = format!("/pets/{}", created["id"].as_str().unwrap());
    let first_etag = headers[header::ETAG].to_str().unwrap().to_string();

    let (status, second, _) = send(
      &app,
      "PATCH",
      &uri,
      vec![(header::IF_MATCH, first_etag.as_str())],
      Some(json!({ "weight": "13" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(second[header::ETAG], first_etag.as_str());

    let (status, _, _) = send(
      &app,
      "PATCH",
      &uri,
      vec![(header::IF_MATCH, first_etag.as_str())],
      Some(json!({ "weight": "14" })),
    )
    .await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);

    let (_, _, current) = send(&app, "GET", &uri, vec![], None).await;
    assert_eq!(current["weight"], "13");
  }

  // ── Delete ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_then_get_is_404() {
    let app = app().await;
    let (_, _, created) =
      send(&app, "POST", "/pets", vec![], Some(pet_payload())).await;
    let uri = format!("/pets/{}", created["id"].as_str().unwrap());

    let (status, _, _) = send(&app, "DELETE", &uri, vec![], None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, "GET", &uri, vec![], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, "DELETE", &uri, vec![], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── List ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_filters_by_owner() {
    let app = app().await;
    for (title, owner) in
      [("Analyst", "xy123"), ("Engineer", "ab12"), ("Manager", "xy123")]
    {
      send(
        &app,
        "POST",
        "/jobs",
        vec![],
        Some(json!({ "title": title, "owner_uni": owner })),
      )
      .await;
    }

    let (status, _, all) = send(&app, "GET", "/jobs", vec![], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, _, owned) =
      send(&app, "GET", "/jobs?owner_uni=xy123", vec![], None).await;
    let owned = owned.as_array().unwrap();
    assert_eq!(owned.len(), 2);
    assert!(owned.iter().all(|j| j["owner_uni"] == "xy123"));

    let (_, _, pets) = send(&app, "GET", "/pets", vec![], None).await;
    assert_eq!(pets, json!([]));
  }

  #[tokio::test]
  async fn list_with_invalid_owner_is_400() {
    let app = app().await;
    let (status, _, _) =
      send(&app, "GET", "/jobs?owner_uni=NOT-A-UNI", vec![], None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Health ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_reports_ok() {
    let app = app().await;
    let (status, _, body) = send(&app, "GET", "/health", vec![], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
  }

  // ── Request bodies ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn malformed_json_is_a_json_400() {
    let app = app().await;
    let (status, body) =
      send_raw(&app, "POST", "/jobs", Some("application/json"), "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn patch_without_content_type_is_a_json_400() {
    let app = app().await;
    let (_, _, created) =
      send(&app, "POST", "/pets", vec![], Some(pet_payload())).await;
    let uri = format!("/pets/{}", created["id"].as_str().unwrap());

    let (status, body) =
      send_raw(&app, "PATCH", &uri, None, r#"{"weight":"25"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  // ── Schema documents ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn schema_document_describes_fields() {
    let app = app().await;
    let (status, _, doc) = send(&app, "GET", "/pets/schema", vec![], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["title"], "pet");
    assert_eq!(
      doc["required"],
      json!(["name", "species", "weight", "owner_uni"])
    );
    assert_eq!(doc["properties"]["breed"]["type"], json!(["string", "null"]));
    assert!(doc["properties"]["weight"]["description"].is_string());
    assert_eq!(doc["properties"]["id"]["readOnly"], true);

    let (_, _, jobs) = send(&app, "GET", "/jobs/schema", vec![], None).await;
    assert_eq!(jobs["properties"]["start_date"]["format"], "date");
  }

  // ── Concurrent updates ──────────────────────────────────────────────────────

  /// Holds the first two `get`s until both have arrived, so two PATCHes read
  /// the same version before either of them writes.
  struct LockstepStore {
    inner: SqliteStore,
    gate:  Barrier,
    gated: AtomicUsize,
  }

  impl<R: Resource> ResourceStore<R> for LockstepStore {
    type Error = campus_store_sqlite::Error;

    async fn create(&self, record: Record<R>) -> Result<Record<R>, Self::Error> {
      self.inner.create(record).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Record<R>>, Self::Error> {
      if self.gated.fetch_add(1, Ordering::SeqCst) < 2 {
        self.gate.wait().await;
      }
      <SqliteStore as ResourceStore<R>>::get(&self.inner, id).await
    }

    async fn replace(
      &self,
      id: Uuid,
      expected: DateTime<Utc>,
      record: Record<R>,
    ) -> Result<Replaced<R>, Self::Error> {
      self.inner.replace(id, expected, record).await
    }

    async fn list<'a>(
      &'a self,
      owner_uni: Option<&'a Uni>,
    ) -> Result<Vec<Record<R>>, Self::Error> {
      <SqliteStore as ResourceStore<R>>::list(&self.inner, owner_uni).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, Self::Error> {
      <SqliteStore as ResourceStore<R>>::delete(&self.inner, id).await
    }
  }

  #[tokio::test]
  async fn concurrent_patches_with_one_etag_cannot_both_win() {
    let inner = SqliteStore::open_in_memory().await.unwrap();
    let record = Schema::<Pet>::default().create(&pet_payload()).unwrap();
    let created = inner.create(record).await.unwrap();
    let id = created.server.id;
    let etag = compute_etag(&created.server);

    let store = Arc::new(LockstepStore {
      inner,
      gate: Barrier::new(2),
      gated: AtomicUsize::new(0),
    });
    let app = api_router(Arc::clone(&store), Arc::new(ColumbiaUni));
    let uri = format!("/pets/{id}");

    let patch = |weight: &'static str| {
      let (app, uri, etag) = (app.clone(), uri.clone(), etag.clone());
      tokio::spawn(async move {
        let headers = vec![(header::IF_MATCH, etag.as_str())];
        let body = Some(json!({ "weight": weight }));
        send(&app, "PATCH", &uri, headers, body).await.0
      })
    };
    let (a, b) = tokio::join!(patch("13"), patch("14"));

    let mut statuses = [a.unwrap().as_u16(), b.unwrap().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 412]);

    let stored = <SqliteStore as ResourceStore<Pet>>::get(&store.inner, id)
      .await
      .unwrap()
      .unwrap();
    assert!(["13", "14"].contains(&stored.body.weight.as_str()));
    assert!(stored.server.updated_at > created.server.updated_at);
  }

  #[tokio::test]
  async fn concurrent_patches_without_etag_both_apply() {
    let inner = SqliteStore::open_in_memory().await.unwrap();
    let record = Schema::<Pet>::default().create(&pet_payload()).unwrap();
    let created = inner.create(record).await.unwrap();
    let id = created.server.id;

    let store = Arc::new(LockstepStore {
      inner,
      gate: Barrier::new(2),
      gated: AtomicUsize::new(0),
    });
    let app = api_router(Arc::clone(&store), Arc::new(ColumbiaUni));
    let uri = format!("/pets/{id}");

    let patch = |body: Value| {
      let (app, uri) = (app.clone(), uri.clone());
      tokio::spawn(async move {
        send(&app, "PATCH", &uri, vec![], Some(body)).await.0
      })
    };
    let (a, b) = tokio::join!(
      patch(json!({ "weight": "13" })),
      patch(json!({ "breed": "Tabby" }))
    );
    assert_eq!(a.unwrap(), StatusCode::OK);
    assert_eq!(b.unwrap(), StatusCode::OK);

    let stored = <SqliteStore as ResourceStore<Pet>>::get(&store.inner, id)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(stored.body.weight, "13");
    assert_eq!(stored.body.breed.as_deref(), Some("Tabby"));
  }
}
