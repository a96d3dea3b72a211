//! Server-owned identity and timestamps.
//!
//! [`ServerFields`] lives apart from every client-writable shape; the only
//! way to obtain one is [`Assigner::on_create`] (or reading it back from a
//! store).

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source of the current time.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Any `Fn() -> DateTime<Utc>` is a clock; handy for pinning time in tests.
impl<F> Clock for F
where
  F: Fn() -> DateTime<Utc> + Send + Sync,
{
  fn now(&self) -> DateTime<Utc> { self() }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Identity and timestamps assigned by the server, never by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerFields {
  pub id:         Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl ServerFields {
  /// Same identity and creation time, new `updated_at`.
  pub(crate) fn touched(self, updated_at: DateTime<Utc>) -> Self {
    Self { updated_at, ..self }
  }
}

/// Mints [`ServerFields`] on create and refreshes `updated_at` on update.
#[derive(Clone)]
pub struct Assigner {
  clock: Arc<dyn Clock>,
}

impl Assigner {
  pub fn new(clock: Arc<dyn Clock>) -> Self { Self { clock } }

  pub fn system() -> Self { Self::new(Arc::new(SystemClock)) }

  /// A fresh random v4 id, with `created_at == updated_at == now`.
  pub fn on_create(&self) -> ServerFields {
    let now = self.clock.now();
    ServerFields {
      id:         Uuid::new_v4(),
      created_at: now,
      updated_at: now,
    }
  }

  /// The next `updated_at` for a record last stamped with `previous`.
  ///
  /// Always strictly later than `previous.updated_at`: if the clock has not
  /// moved past it, the previous value plus one microsecond is used.
  pub fn on_update(&self, previous: &ServerFields) -> DateTime<Utc> {
    let floor = previous.updated_at + TimeDelta::microseconds(1);
    self.clock.now().max(floor)
  }
}

impl Default for Assigner {
  fn default() -> Self { Self::system() }
}

impl std::fmt::Debug for Assigner {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Assigner").finish_non_exhaustive()
  }
}
