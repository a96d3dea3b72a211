//! UNI — the institutional identifier that owns every resource.
//!
//! The format rules belong to the Person service. This crate consumes them
//! through [`UniValidator`] and afterwards treats a [`Uni`] as an opaque
//! string. Whether the referenced person exists is never checked here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Syntactic UNI check supplied by the Person collaborator.
pub trait UniValidator: Send + Sync {
  fn is_valid_uni(&self, text: &str) -> bool;
}

impl<F> UniValidator for F
where
  F: Fn(&str) -> bool + Send + Sync,
{
  fn is_valid_uni(&self, text: &str) -> bool { self(text) }
}

/// The default rule: two or three lowercase ASCII letters followed by one to
/// four ASCII digits (`xy123`, `abc1234`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumbiaUni;

impl UniValidator for ColumbiaUni {
  fn is_valid_uni(&self, text: &str) -> bool {
    let letters = text.bytes().take_while(u8::is_ascii_lowercase).count();
    let digits = &text.as_bytes()[letters..];
    (2..=3).contains(&letters)
      && (1..=4).contains(&digits.len())
      && digits.iter().all(u8::is_ascii_digit)
  }
}

/// A UNI accepted by a [`UniValidator`].
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Uni(String);

impl Uni {
  /// Wrap `text` if `validator` accepts it.
  pub fn parse(text: &str, validator: &dyn UniValidator) -> Option<Self> {
    validator.is_valid_uni(text).then(|| Self(text.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl AsRef<str> for Uni {
  fn as_ref(&self) -> &str { &self.0 }
}

impl fmt::Display for Uni {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
