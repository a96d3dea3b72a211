//! Merge-patch: fold a validated [`FieldPatch`] onto stored values.

use crate::{
  Error, Result,
  constraint::ConstraintSet,
  value::{Change, FieldPatch, FieldValues},
};

/// Apply `patch` to `stored`, returning the merged values.
///
/// Supplied fields replace or clear the stored value; omitted fields are
/// carried over untouched. Fails with [`Error::NotApplicable`] when the patch
/// was built for another resource, names an undeclared field, or clears a
/// required one. A patch produced by
/// [`validate_update`](crate::validate::validate_update) against the same
/// constraint set never fails.
pub fn apply(
  stored: &FieldValues,
  patch: &FieldPatch,
  constraints: &ConstraintSet,
) -> Result<FieldValues> {
  let not_applicable = |field: &str| Error::NotApplicable {
    resource: constraints.resource,
    field:    field.to_owned(),
  };

  if patch.resource() != constraints.resource
    || stored.resource() != constraints.resource
  {
    return Err(not_applicable("*"));
  }

  let mut merged = stored.clone();
  for (name, change) in patch.iter() {
    let field = constraints.field(name).ok_or_else(|| not_applicable(name))?;
    match change {
      Change::Set(value) => merged.insert(field.name, Some(value.clone())),
      Change::Clear if field.is_required() => return Err(not_applicable(name)),
      Change::Clear => merged.insert(field.name, None),
    }
  }
  Ok(merged)
}
