//! Field constraint sets — the static declaration of a resource's fields.
//!
//! A [`ConstraintSet`] names each client-writable field, its semantic type
//! and whether it is required. Sets are `static` and never mutated; the
//! validator and merge engine read them, nothing writes them.
//! [`ConstraintSet::document`] renders one as a JSON Schema for clients.

use serde_json::{Map, Value, json};

/// Fields owned by the server, with their JSON Schema string format. Never
/// accepted from a client payload.
pub const SERVER_FIELDS: &[(&str, &str)] = &[
  ("id", "uuid"),
  ("created_at", "date-time"),
  ("updated_at", "date-time"),
];

// ─── Field types ─────────────────────────────────────────────────────────────

/// The semantic type of a field, beyond its JSON representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
  /// Any string, including the empty string.
  Text,
  /// A string with at least one non-whitespace character.
  NonEmptyText,
  /// A string whose length in characters lies in `min..=max`.
  BoundedText { min: usize, max: usize },
  /// An ISO-8601 calendar date, `YYYY-MM-DD`.
  Date,
  /// An institutional person identifier, checked by a
  /// [`UniValidator`](crate::uni::UniValidator).
  Uni,
  /// One of a fixed set of strings.
  Enumerated(&'static [&'static str]),
}

impl FieldType {
  /// JSON Schema keywords for a present value of this type.
  pub fn schema(&self) -> Value {
    match self {
      Self::Text => json!({ "type": "string" }),
      Self::NonEmptyText => {
        json!({ "type": "string", "minLength": 1, "pattern": "\\S" })
      }
      Self::BoundedText { min, max } => {
        json!({ "type": "string", "minLength": min, "maxLength": max })
      }
      Self::Date => json!({ "type": "string", "format": "date" }),
      Self::Uni => json!({ "type": "string", "format": "uni" }),
      Self::Enumerated(allowed) => json!({ "type": "string", "enum": allowed }),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
  Required,
  Optional,
}

// ─── Field declaration ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct FieldConstraint {
  pub name:        &'static str,
  pub ty:          FieldType,
  pub presence:    Presence,
  pub description: &'static str,
  pub example:     &'static str,
}

impl FieldConstraint {
  pub const fn required(name: &'static str, ty: FieldType) -> Self {
    Self {
      name,
      ty,
      presence: Presence::Required,
      description: "",
      example: "",
    }
  }

  pub const fn optional(name: &'static str, ty: FieldType) -> Self {
    Self {
      name,
      ty,
      presence: Presence::Optional,
      description: "",
      example: "",
    }
  }

  /// Attach documentation to the declaration.
  pub const fn describe(
    self,
    description: &'static str,
    example: &'static str,
  ) -> Self {
    Self {
      description,
      example,
      ..self
    }
  }

  pub fn is_required(&self) -> bool { self.presence == Presence::Required }
}

// ─── Constraint set ──────────────────────────────────────────────────────────

/// The full field declaration of one resource kind.
#[derive(Debug)]
pub struct ConstraintSet {
  /// Singular resource name, e.g. `"job"`.
  pub resource: &'static str,
  /// Fields in declaration order. Validation errors follow this order.
  pub fields:   &'static [FieldConstraint],
}

impl ConstraintSet {
  pub const fn new(
    resource: &'static str,
    fields: &'static [FieldConstraint],
  ) -> Self {
    Self { resource, fields }
  }

  /// Look up a declared field by name.
  pub fn field(&self, name: &str) -> Option<&'static FieldConstraint> {
    let fields = self.fields;
    fields.iter().find(|f| f.name == name)
  }

  pub fn required(&self) -> impl Iterator<Item = &'static FieldConstraint> {
    let fields = self.fields;
    fields.iter().filter(|f| f.is_required())
  }

  /// JSON Schema of the Read shape. Server fields are marked `readOnly`;
  /// optional fields admit `null`.
  pub fn document(&self) -> Value {
    let mut properties = Map::new();
    for (name, format) in SERVER_FIELDS {
      properties.insert(
        (*name).to_owned(),
        json!({ "type": "string", "format": format, "readOnly": true }),
      );
    }
    for field in self.fields {
      let mut schema = field.ty.schema();
      if !field.is_required() {
        schema["type"] = json!(["string", "null"]);
      }
      if !field.description.is_empty() {
        schema["description"] = json!(field.description);
      }
      if !field.example.is_empty() {
        schema["examples"] = json!([field.example]);
      }
      properties.insert(field.name.to_owned(), schema);
    }

    let required: Vec<&str> = self.required().map(|f| f.name).collect();
    json!({
      "title": self.resource,
      "type": "object",
      "properties": properties,
      "required": required,
      "additionalProperties": false,
    })
  }
}
