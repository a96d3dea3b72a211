//! Validated field values, keyed by declared field name.
//!
//! [`FieldValues`] is the untyped form of a Create or Read body: every
//! declared field is present, with `None` as the explicit "no value" marker.
//! [`FieldPatch`] is the untyped form of an Update: it only holds the fields
//! the client actually sent.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{Error, Result, uni::Uni};

// ─── Single values ───────────────────────────────────────────────────────────

/// A value that has passed its field's type and format rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
  Text(String),
  Date(NaiveDate),
  Uni(Uni),
}

impl From<String> for FieldValue {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<NaiveDate> for FieldValue {
  fn from(d: NaiveDate) -> Self { Self::Date(d) }
}

impl From<Uni> for FieldValue {
  fn from(u: Uni) -> Self { Self::Uni(u) }
}

// ─── Complete value sets ─────────────────────────────────────────────────────

/// Values for every field of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues {
  resource: &'static str,
  values:   BTreeMap<&'static str, Option<FieldValue>>,
}

impl FieldValues {
  pub fn new(resource: &'static str) -> Self {
    Self {
      resource,
      values: BTreeMap::new(),
    }
  }

  pub fn resource(&self) -> &'static str { self.resource }

  /// Builder form of [`FieldValues::insert`].
  pub fn with(
    mut self,
    name: &'static str,
    value: Option<FieldValue>,
  ) -> Self {
    self.insert(name, value);
    self
  }

  pub fn insert(&mut self, name: &'static str, value: Option<FieldValue>) {
    self.values.insert(name, value);
  }

  /// The value of `name`; `None` if the field has no value or is unknown.
  pub fn get(&self, name: &str) -> Option<&FieldValue> {
    self.values.get(name).and_then(Option::as_ref)
  }

  pub fn contains(&self, name: &str) -> bool { self.values.contains_key(name) }

  pub fn iter(
    &self,
  ) -> impl Iterator<Item = (&'static str, Option<&FieldValue>)> {
    self.values.iter().map(|(k, v)| (*k, v.as_ref()))
  }

  // ── Typed extraction ───────────────────────────────────────────────────

  pub fn take_text(&mut self, name: &str) -> Result<String> {
    match self.take(name) {
      Some(FieldValue::Text(s)) => Ok(s),
      _ => Err(self.drift(name)),
    }
  }

  pub fn take_opt_text(&mut self, name: &str) -> Result<Option<String>> {
    match self.take(name) {
      None => Ok(None),
      Some(FieldValue::Text(s)) => Ok(Some(s)),
      Some(_) => Err(self.drift(name)),
    }
  }

  pub fn take_opt_date(&mut self, name: &str) -> Result<Option<NaiveDate>> {
    match self.take(name) {
      None => Ok(None),
      Some(FieldValue::Date(d)) => Ok(Some(d)),
      Some(_) => Err(self.drift(name)),
    }
  }

  pub fn take_uni(&mut self, name: &str) -> Result<Uni> {
    match self.take(name) {
      Some(FieldValue::Uni(u)) => Ok(u),
      _ => Err(self.drift(name)),
    }
  }

  fn take(&mut self, name: &str) -> Option<FieldValue> {
    self.values.remove(name).flatten()
  }

  fn drift(&self, name: &str) -> Error {
    Error::NotApplicable {
      resource: self.resource,
      field:    name.to_owned(),
    }
  }
}

// ─── Partial updates ─────────────────────────────────────────────────────────

/// What an Update does to one field it mentions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
  /// Replace the stored value.
  Set(FieldValue),
  /// Remove the stored value. Only valid for optional fields.
  Clear,
}

/// The fields supplied by one Update payload. Omitted fields are absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPatch {
  resource: &'static str,
  changes:  BTreeMap<&'static str, Change>,
}

impl FieldPatch {
  pub fn new(resource: &'static str) -> Self {
    Self {
      resource,
      changes: BTreeMap::new(),
    }
  }

  pub fn resource(&self) -> &'static str { self.resource }

  pub fn set(mut self, name: &'static str, value: FieldValue) -> Self {
    self.changes.insert(name, Change::Set(value));
    self
  }

  pub fn clear(mut self, name: &'static str) -> Self {
    self.changes.insert(name, Change::Clear);
    self
  }

  /// The change for `name`, or `None` if the client omitted it.
  pub fn get(&self, name: &str) -> Option<&Change> { self.changes.get(name) }

  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Change)> {
    self.changes.iter().map(|(k, v)| (*k, v))
  }

  pub fn len(&self) -> usize { self.changes.len() }

  pub fn is_empty(&self) -> bool { self.changes.is_empty() }
}
