//! Pet — an animal owned by the person identified by `owner_uni`.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  constraint::{ConstraintSet, FieldConstraint, FieldType},
  resource::{Resource, ResourceKind},
  uni::Uni,
  value::{FieldValue, FieldValues},
};

const PET_FIELDS: &[FieldConstraint] = &[
  FieldConstraint::required("name", FieldType::Text)
    .describe("Given name.", "Scooby"),
  FieldConstraint::required("species", FieldType::Text)
    .describe("Type of pet.", "Dog"),
  FieldConstraint::optional("breed", FieldType::Text)
    .describe("Breed of pet type.", "Dachshund"),
  // Stored as text; the unit is pounds.
  FieldConstraint::required("weight", FieldType::Text)
    .describe("Weight of pet in pounds.", "10"),
  FieldConstraint::required("owner_uni", FieldType::Uni)
    .describe("UNI of the person who owns this pet.", "abc2456"),
];

pub static PET: ConstraintSet = ConstraintSet::new("pet", PET_FIELDS);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
  pub name:      String,
  pub species:   String,
  pub breed:     Option<String>,
  pub weight:    String,
  pub owner_uni: Uni,
}

impl Resource for Pet {
  const KIND: ResourceKind = ResourceKind::Pet;

  fn from_values(mut values: FieldValues) -> Result<Self> {
    Ok(Self {
      name:      values.take_text("name")?,
      species:   values.take_text("species")?,
      breed:     values.take_opt_text("breed")?,
      weight:    values.take_text("weight")?,
      owner_uni: values.take_uni("owner_uni")?,
    })
  }

  fn to_values(&self) -> FieldValues {
    FieldValues::new(PET.resource)
      .with("name", Some(self.name.clone().into()))
      .with("species", Some(self.species.clone().into()))
      .with("breed", self.breed.clone().map(FieldValue::from))
      .with("weight", Some(self.weight.clone().into()))
      .with("owner_uni", Some(self.owner_uni.clone().into()))
  }

  fn owner_uni(&self) -> &Uni { &self.owner_uni }
}
