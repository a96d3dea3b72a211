//! Resource schema and partial-update validation for the Campus service.
//!
//! Jobs and pets are described by a static [`ConstraintSet`]; one generic
//! engine validates inbound JSON against it, assigns server-owned identity
//! and timestamps, and merges partial updates onto stored records.
//!
//! No HTTP or database code lives here; persistence is reached through the
//! [`store::ResourceStore`] trait and the clock through [`Clock`].
//!
//! # Quick start
//!
//! ```no_run
//! use campus_core::{Schema, job::Job};
//! use serde_json::json;
//!
//! let schema = Schema::<Job>::default();
//! let record = schema
//!   .create(&json!({ "title": "Data Analyst", "owner_uni": "xy123" }))
//!   .unwrap();
//! assert_eq!(record.server.created_at, record.server.updated_at);
//! ```

pub mod constraint;
pub mod error;
pub mod job;
pub mod merge;
pub mod pet;
pub mod resource;
pub mod stamp;
pub mod store;
pub mod uni;
pub mod validate;
pub mod value;

pub use constraint::{ConstraintSet, FieldConstraint, FieldType, Presence};
pub use error::{Error, FieldError, Result, ValidationError};
pub use resource::{Record, Resource, ResourceKind, Schema, Update};
pub use stamp::{Assigner, Clock, ServerFields, SystemClock};
pub use uni::{ColumbiaUni, Uni, UniValidator};
pub use value::{Change, FieldPatch, FieldValue, FieldValues};
