//! The typed surface: one generic schema over every resource kind.
//!
//! A resource kind is a plain struct (its Create shape) implementing
//! [`Resource`]. The Read shape is [`Record<R>`], which composes the body with
//! [`ServerFields`]; the Update shape is [`Update<R>`]. Neither the body nor
//! the update can carry server-owned fields.

use std::{marker::PhantomData, sync::Arc};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
  Result,
  constraint::ConstraintSet,
  error::ValidationError,
  job::JOB,
  merge,
  pet::PET,
  stamp::{Assigner, ServerFields},
  uni::{ColumbiaUni, Uni, UniValidator},
  validate,
  value::{FieldPatch, FieldValues},
};

// ─── Kinds ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
  Job,
  Pet,
}

impl ResourceKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Job => "job",
      Self::Pet => "pet",
    }
  }

  /// Plural name, used for collection paths and table names.
  pub fn collection(&self) -> &'static str {
    match self {
      Self::Job => "jobs",
      Self::Pet => "pets",
    }
  }

  pub fn constraints(&self) -> &'static ConstraintSet {
    match self {
      Self::Job => &JOB,
      Self::Pet => &PET,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A client-writable resource body bound to its [`ConstraintSet`].
pub trait Resource:
  Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
  const KIND: ResourceKind;

  fn constraints() -> &'static ConstraintSet { Self::KIND.constraints() }

  /// Build the body from validated values. Fails only on schema drift.
  fn from_values(values: FieldValues) -> Result<Self>;

  fn to_values(&self) -> FieldValues;

  fn owner_uni(&self) -> &Uni;
}

// ─── Shapes ──────────────────────────────────────────────────────────────────

/// The Read shape: server fields plus the body, flattened on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<R> {
  #[serde(flatten)]
  pub server: ServerFields,
  #[serde(flatten)]
  pub body:   R,
}

/// The Update shape for `R`: only the fields the client supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct Update<R> {
  patch:     FieldPatch,
  _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Update<R> {
  /// Wrap an untyped patch. It is checked against `R` when applied.
  pub fn from_patch(patch: FieldPatch) -> Self {
    Self {
      patch,
      _resource: PhantomData,
    }
  }

  pub fn patch(&self) -> &FieldPatch { &self.patch }

  pub fn is_empty(&self) -> bool { self.patch.is_empty() }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

/// The public surface for one resource kind.
///
/// Holds the UNI collaborator and the timestamp assigner; both are shared,
/// so cloning is cheap.
pub struct Schema<R> {
  unis:      Arc<dyn UniValidator>,
  assigner:  Assigner,
  _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Schema<R> {
  pub fn new(unis: Arc<dyn UniValidator>, assigner: Assigner) -> Self {
    Self {
      unis,
      assigner,
      _resource: PhantomData,
    }
  }

  pub fn constraints(&self) -> &'static ConstraintSet { R::constraints() }

  /// Check a UNI outside of a payload, e.g. a query filter.
  pub fn parse_uni(&self, text: &str) -> Option<Uni> {
    Uni::parse(text, self.unis.as_ref())
  }

  /// Validate a Create payload into the typed body.
  pub fn validate_create(&self, payload: &Value) -> Result<R> {
    let values =
      validate::validate_create(payload, R::constraints(), self.unis.as_ref())?;
    R::from_values(values)
  }

  /// Validate an Update payload. `{}` is a valid no-op update.
  pub fn validate_update(
    &self,
    payload: &Value,
  ) -> Result<Update<R>, ValidationError> {
    validate::validate_update(payload, R::constraints(), self.unis.as_ref())
      .map(Update::from_patch)
  }

  /// Attach a fresh id and timestamps to a validated body.
  pub fn assign_on_create(&self, body: R) -> Record<R> {
    Record {
      server: self.assigner.on_create(),
      body,
    }
  }

  /// Merge `patch` onto `stored`, producing a new record with a refreshed
  /// `updated_at`. `stored` is left untouched.
  pub fn apply_patch(
    &self,
    stored: &Record<R>,
    patch: &Update<R>,
  ) -> Result<Record<R>> {
    let merged =
      merge::apply(&stored.body.to_values(), patch.patch(), R::constraints())?;
    Ok(Record {
      server: stored.server.touched(self.assigner.on_update(&stored.server)),
      body:   R::from_values(merged)?,
    })
  }

  /// [`validate_create`](Self::validate_create) followed by
  /// [`assign_on_create`](Self::assign_on_create).
  pub fn create(&self, payload: &Value) -> Result<Record<R>> {
    Ok(self.assign_on_create(self.validate_create(payload)?))
  }

  /// [`validate_update`](Self::validate_update) followed by
  /// [`apply_patch`](Self::apply_patch).
  pub fn update(&self, stored: &Record<R>, payload: &Value) -> Result<Record<R>> {
    let patch = self.validate_update(payload)?;
    self.apply_patch(stored, &patch)
  }
}

impl<R: Resource> Default for Schema<R> {
  fn default() -> Self { Self::new(Arc::new(ColumbiaUni), Assigner::system()) }
}

impl<R> Clone for Schema<R> {
  fn clone(&self) -> Self {
    Self {
      unis:      Arc::clone(&self.unis),
      assigner:  self.assigner.clone(),
      _resource: PhantomData,
    }
  }
}
