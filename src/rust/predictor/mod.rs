mod encoding;
mod error;
mod onnx;
mod outcome;

pub use encoding::MISSING_CATEGORY;
pub use error::PredictorError;
pub use onnx::{OnnxPredictor, OnnxPredictorBuilder};
pub use outcome::{Attrition, Prediction};

use crate::features::{FeatureRecord, FeatureSchema};

/// A trained binary classifier that consumes aligned feature records.
///
/// Implementations must be safe to share across threads; they are read-only
/// once constructed.
pub trait Predictor: Send + Sync {
    /// The feature order and categorical fields the model was trained on
    fn schema(&self) -> &FeatureSchema;

    /// Returns one label per record (0 = stay, 1 = leave)
    fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<i64>, PredictorError>;

    /// Returns `[p(stay), p(leave)]` per record
    fn predict_proba(&self, records: &[FeatureRecord]) -> Result<Vec<[f32; 2]>, PredictorError>;

    /// Classifies a single aligned record
    fn classify(&self, record: &FeatureRecord) -> Result<Prediction, PredictorError> {
        let records = std::slice::from_ref(record);
        let labels = self.predict(records)?;
        let probabilities = self.predict_proba(records)?;
        match (labels.first(), probabilities.first()) {
            (Some(&label), Some(p)) => Prediction::from_outputs(label, f64::from(p[1])),
            _ => Err(PredictorError::PredictionError("model returned no output for the record".into())),
        }
    }
}
