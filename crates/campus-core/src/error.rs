//! Error types for `campus-core`.

use serde::Serialize;
use thiserror::Error;

/// One field-level violation found while validating a payload.
///
/// Serialises as `{"kind":"missing_or_invalid","field":"title"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum FieldError {
  /// A required field is absent, `null`, or of the wrong JSON type.
  #[error("{0}: missing or invalid")]
  MissingOrInvalid(String),

  /// The value has the right JSON type but fails its format rule.
  #[error("{0}: invalid format")]
  InvalidFormat(String),

  /// An optional field is present with the wrong JSON type.
  #[error("{0}: type mismatch")]
  TypeMismatch(String),

  /// The key is not declared for the resource, or is server-managed.
  #[error("{0}: unknown or server-managed field")]
  UnknownField(String),

  #[error("payload is not a JSON object")]
  NotAnObject,
}

impl FieldError {
  /// The offending field name, if the violation concerns a single field.
  pub fn field(&self) -> Option<&str> {
    match self {
      Self::MissingOrInvalid(f)
      | Self::InvalidFormat(f)
      | Self::TypeMismatch(f)
      | Self::UnknownField(f) => Some(f),
      Self::NotAnObject => None,
    }
  }
}

/// Every violation found in one payload, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("invalid {resource} payload: {} violation(s)", .errors.len())]
pub struct ValidationError {
  pub resource: &'static str,
  pub errors:   Vec<FieldError>,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// A patch or value set does not fit the resource's constraint set.
  /// This is a schema-drift defect, never a client error.
  #[error("not applicable to {resource}: field {field:?}")]
  NotApplicable {
    resource: &'static str,
    field:    String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
