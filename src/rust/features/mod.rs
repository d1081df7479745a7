//! Feature records, model schemas, and the alignment step between them.

mod align;
pub mod profile;
mod schema;
mod value;

pub use align::{align, align_with_policy, AlignError, AlignmentPolicy};
pub use profile::{EmployeeProfile, NumericInput, DEFAULT_VALUES, NUMERIC_INPUTS};
pub use schema::FeatureSchema;
pub use value::{FeatureRecord, FeatureValue};
