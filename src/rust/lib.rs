//! Employee attrition prediction on top of a pre-trained ONNX classifier.
//!
//! The crate turns a set of employee attributes into a single feature record,
//! aligns that record to the column order and types the model was trained
//! on, and reports whether the employee is likely to stay or leave together
//! with the probability of leaving.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use attrition::{AlignmentPolicy, EmployeeProfile, PredictionContext, RuntimeConfig};
//!
//! let context = PredictionContext::load("artifacts/attrition", RuntimeConfig::default())?;
//!
//! let profile = EmployeeProfile {
//!     age: 29,
//!     over_time: true,
//!     department: "Sales".to_string(),
//!     job_role: "Sales Executive".to_string(),
//!     ..Default::default()
//! };
//! let prediction = context.predict_profile(&profile, AlignmentPolicy::Strict)?;
//! println!("{}: {}", prediction.outcome, prediction.risk_percent());
//! # Ok(())
//! # }
//! ```
//!
//! # Alignment
//!
//! [`align`] is a pure function and can be used without a model:
//!
//! ```rust
//! use attrition::{align, FeatureRecord, FeatureSchema, FeatureValue};
//!
//! let schema = FeatureSchema::new(["Age", "Department", "OverTime"], ["Department"]);
//! let raw = FeatureRecord::new()
//!     .with("OverTime", 1i64)
//!     .with("Department", "Sales")
//!     .with("Age", 30i64);
//!
//! let aligned = align(&raw, &schema).unwrap();
//! assert_eq!(aligned.names().collect::<Vec<_>>(), ["Age", "Department", "OverTime"]);
//! assert_eq!(aligned.get("OverTime"), Some(&FeatureValue::Int(1)));
//! ```

pub mod artifact;
pub mod context;
pub mod features;
pub mod predictor;
mod runtime;

pub use artifact::{ArtifactBundle, ArtifactError, ArtifactSource, ArtifactStore, Manifest, DEFAULT_BUNDLE};
pub use context::PredictionContext;
pub use features::{
    align, align_with_policy, AlignError, AlignmentPolicy, EmployeeProfile, FeatureRecord,
    FeatureSchema, FeatureValue,
};
pub use predictor::{
    Attrition, OnnxPredictor, OnnxPredictorBuilder, Prediction, Predictor, PredictorError, MISSING_CATEGORY,
};
pub use runtime::{create_session_builder, RuntimeConfig};

pub fn init_logger() {
    env_logger::init();
}
