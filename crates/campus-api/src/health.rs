//! Liveness probe.

use axum::{Json, Router, routing::get};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Health {
  status:  &'static str,
  version: &'static str,
}

async fn health() -> Json<Health> {
  Json(Health {
    status:  "ok",
    version: env!("CARGO_PKG_VERSION"),
  })
}

pub fn router() -> Router { Router::new().route("/health", get(health)) }
