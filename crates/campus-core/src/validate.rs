//! The variant validator: inbound JSON against a [`ConstraintSet`].
//!
//! Both entry points collect every violation before returning, so a single
//! response can tell the client everything that is wrong with a payload.
//! Nothing is defaulted; the only coercions are the declared ones (a date
//! string becomes a [`NaiveDate`], an accepted UNI becomes a [`Uni`]).
//!
//! Error mapping:
//!
//! | Situation | Required field | Optional field |
//! |-----------|----------------|----------------|
//! | absent | `MissingOrInvalid` (create only) | no value |
//! | `null` | `MissingOrInvalid` | no value / clear |
//! | wrong JSON type | `MissingOrInvalid` | `TypeMismatch` |
//! | bad format | `InvalidFormat` | `InvalidFormat` |

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::{
  constraint::{ConstraintSet, FieldConstraint, FieldType, Presence},
  error::{FieldError, ValidationError},
  uni::{Uni, UniValidator},
  value::{FieldPatch, FieldValue, FieldValues},
};

/// Validate a Create payload. Every declared field appears in the result.
pub fn validate_create(
  payload: &Value,
  constraints: &ConstraintSet,
  unis: &dyn UniValidator,
) -> Result<FieldValues, ValidationError> {
  let object = as_object(payload, constraints)?;
  let mut errors = Vec::new();
  let mut values = FieldValues::new(constraints.resource);

  for field in constraints.fields {
    match object.get(field.name).filter(|v| !v.is_null()) {
      Some(raw) => match coerce(field, raw, unis) {
        Ok(value) => values.insert(field.name, Some(value)),
        Err(rejection) => errors.push(rejection.report(field)),
      },
      None if field.is_required() => {
        errors.push(FieldError::MissingOrInvalid(field.name.to_owned()))
      }
      None => values.insert(field.name, None),
    }
  }

  errors.extend(unknown_fields(object, constraints));
  finish(constraints, errors, values)
}

/// Validate an Update payload. Only supplied fields appear in the result;
/// an explicit `null` on an optional field becomes a clear.
pub fn validate_update(
  payload: &Value,
  constraints: &ConstraintSet,
  unis: &dyn UniValidator,
) -> Result<FieldPatch, ValidationError> {
  let object = as_object(payload, constraints)?;
  let mut errors = Vec::new();
  let mut patch = FieldPatch::new(constraints.resource);

  for field in constraints.fields {
    let Some(raw) = object.get(field.name) else {
      continue;
    };
    match (raw, field.presence) {
      (Value::Null, Presence::Required) => {
        errors.push(FieldError::MissingOrInvalid(field.name.to_owned()))
      }
      (Value::Null, Presence::Optional) => patch = patch.clear(field.name),
      (raw, _) => match coerce(field, raw, unis) {
        Ok(value) => patch = patch.set(field.name, value),
        Err(rejection) => errors.push(rejection.report(field)),
      },
    }
  }

  errors.extend(unknown_fields(object, constraints));
  finish(constraints, errors, patch)
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn as_object<'a>(
  payload: &'a Value,
  constraints: &ConstraintSet,
) -> Result<&'a Map<String, Value>, ValidationError> {
  payload.as_object().ok_or_else(|| ValidationError {
    resource: constraints.resource,
    errors:   vec![FieldError::NotAnObject],
  })
}

/// Keys that are not declared, including server-managed ones.
fn unknown_fields<'a>(
  object: &'a Map<String, Value>,
  constraints: &'a ConstraintSet,
) -> impl Iterator<Item = FieldError> + 'a {
  object
    .keys()
    .filter(|k| constraints.field(k).is_none())
    .map(|k| FieldError::UnknownField(k.clone()))
}

fn finish<T>(
  constraints: &ConstraintSet,
  errors: Vec<FieldError>,
  ok: T,
) -> Result<T, ValidationError> {
  if errors.is_empty() {
    Ok(ok)
  } else {
    Err(ValidationError {
      resource: constraints.resource,
      errors,
    })
  }
}

// ─── Coercion ────────────────────────────────────────────────────────────────

enum Rejection {
  WrongType,
  BadFormat,
}

impl Rejection {
  fn report(self, field: &FieldConstraint) -> FieldError {
    let name = field.name.to_owned();
    match (self, field.presence) {
      (Self::WrongType, Presence::Required) => FieldError::MissingOrInvalid(name),
      (Self::WrongType, Presence::Optional) => FieldError::TypeMismatch(name),
      (Self::BadFormat, _) => FieldError::InvalidFormat(name),
    }
  }
}

/// Check one non-null raw value against its declared type.
fn coerce(
  field: &FieldConstraint,
  raw: &Value,
  unis: &dyn UniValidator,
) -> Result<FieldValue, Rejection> {
  let text = raw.as_str().ok_or(Rejection::WrongType)?;

  match field.ty {
    FieldType::Text => Ok(FieldValue::Text(text.to_owned())),
    FieldType::NonEmptyText => {
      if text.trim().is_empty() {
        Err(Rejection::BadFormat)
      } else {
        Ok(FieldValue::Text(text.to_owned()))
      }
    }
    FieldType::BoundedText { min, max } => {
      let len = text.chars().count();
      if (min..=max).contains(&len) {
        Ok(FieldValue::Text(text.to_owned()))
      } else {
        Err(Rejection::BadFormat)
      }
    }
    FieldType::Date => parse_date(text)
      .map(FieldValue::Date)
      .ok_or(Rejection::BadFormat),
    FieldType::Uni => Uni::parse(text, unis)
      .map(FieldValue::Uni)
      .ok_or(Rejection::BadFormat),
    FieldType::Enumerated(allowed) => {
      if allowed.iter().any(|a| *a == text) {
        Ok(FieldValue::Text(text.to_owned()))
      } else {
        Err(Rejection::BadFormat)
      }
    }
  }
}

/// Strict `YYYY-MM-DD`; chrono alone would also accept unpadded fields and
/// signed years.
fn parse_date(text: &str) -> Option<NaiveDate> {
  let bytes = text.as_bytes();
  let laid_out = bytes.len() == 10
    && bytes.iter().enumerate().all(|(i, b)| match i {
      4 | 7 => *b == b'-',
      _ => b.is_ascii_digit(),
    });
  if !laid_out {
    return None;
  }
  NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}
