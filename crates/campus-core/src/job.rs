//! Job — a position held by the person identified by `owner_uni`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  constraint::{ConstraintSet, FieldConstraint, FieldType},
  resource::{Resource, ResourceKind},
  uni::Uni,
  value::{FieldValue, FieldValues},
};

const JOB_FIELDS: &[FieldConstraint] = &[
  FieldConstraint::required("title", FieldType::NonEmptyText)
    .describe("Title of the job.", "Software Engineer"),
  FieldConstraint::optional("description", FieldType::Text).describe(
    "Optional description of the job.",
    "Develop and maintain backend APIs.",
  ),
  FieldConstraint::optional("start_date", FieldType::Date)
    .describe("Job start date.", "2025-09-15"),
  FieldConstraint::optional("end_date", FieldType::Date)
    .describe("Job end date, if applicable.", "2026-09-15"),
  FieldConstraint::required("owner_uni", FieldType::Uni).describe(
    "UNI of the person associated with this job.",
    "abc1234",
  ),
];

pub static JOB: ConstraintSet = ConstraintSet::new("job", JOB_FIELDS);

/// The Create shape of a job, and the body of its Read shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
  pub title:       String,
  pub description: Option<String>,
  pub start_date:  Option<NaiveDate>,
  pub end_date:    Option<NaiveDate>,
  pub owner_uni:   Uni,
}

impl Resource for Job {
  const KIND: ResourceKind = ResourceKind::Job;

  fn from_values(mut values: FieldValues) -> Result<Self> {
    Ok(Self {
      title:       values.take_text("title")?,
      description: values.take_opt_text("description")?,
      start_date:  values.take_opt_date("start_date")?,
      end_date:    values.take_opt_date("end_date")?,
      owner_uni:   values.take_uni("owner_uni")?,
    })
  }

  fn to_values(&self) -> FieldValues {
    FieldValues::new(JOB.resource)
      .with("title", Some(self.title.clone().into()))
      .with("description", self.description.clone().map(FieldValue::from))
      .with("start_date", self.start_date.map(FieldValue::from))
      .with("end_date", self.end_date.map(FieldValue::from))
      .with("owner_uni", Some(self.owner_uni.clone().into()))
  }

  fn owner_uni(&self) -> &Uni { &self.owner_uni }
}
