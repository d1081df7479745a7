use std::path::Path;
use std::sync::Arc;
use log::info;

use crate::artifact::ArtifactBundle;
use crate::features::{align_with_policy, AlignmentPolicy, EmployeeProfile, FeatureRecord, FeatureSchema};
use crate::predictor::{OnnxPredictor, Prediction, Predictor, PredictorError};
use crate::runtime::RuntimeConfig;

/// Everything a request needs, loaded once at startup and never mutated.
///
/// Cloning is cheap; clones share the same artifact and model.
#[derive(Clone)]
pub struct PredictionContext {
    bundle: Arc<ArtifactBundle>,
    predictor: Arc<dyn Predictor>,
}

impl std::fmt::Debug for PredictionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionContext")
            .field("bundle", &self.bundle.name())
            .field("features", &self.predictor.schema().len())
            .finish()
    }
}

impl PredictionContext {
    /// Loads the bundle in `dir` and builds an ONNX predictor for it.
    ///
    /// Any failure here is fatal: the caller must not serve requests.
    pub fn load(dir: impl AsRef<Path>, runtime_config: RuntimeConfig) -> Result<Self, PredictorError> {
        let bundle = ArtifactBundle::load(dir)?;
        let predictor = OnnxPredictor::builder()
            .with_runtime_config(runtime_config)
            .with_bundle(bundle.clone())?
            .build()?;
        Self::new(bundle, Arc::new(predictor))
    }

    /// Pairs a bundle with an already-built predictor.
    ///
    /// The predictor's schema must equal the bundle's.
    pub fn new(bundle: ArtifactBundle, predictor: Arc<dyn Predictor>) -> Result<Self, PredictorError> {
        if predictor.schema() != bundle.schema() {
            return Err(PredictorError::ModelError(format!(
                "model features [{}] differ from manifest features [{}]",
                predictor.schema().names().join(", "),
                bundle.schema().names().join(", ")
            )));
        }
        info!("Prediction context ready for artifact '{}'", bundle.name());
        Ok(Self {
            bundle: Arc::new(bundle),
            predictor,
        })
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.predictor.schema()
    }

    /// Valid choices for a categorical field
    pub fn choices(&self, field: &str) -> Vec<String> {
        self.bundle.choices(field)
    }

    /// Runs one Input Collector → Aligner → Predictor pass for a profile
    pub fn predict_profile(
        &self,
        profile: &EmployeeProfile,
        policy: AlignmentPolicy,
    ) -> Result<Prediction, PredictorError> {
        profile.validate().map_err(PredictorError::ValidationError)?;
        self.predict_record(&profile.to_record(), policy)
    }

    /// Aligns a raw record and classifies it
    pub fn predict_record(
        &self,
        raw: &FeatureRecord,
        policy: AlignmentPolicy,
    ) -> Result<Prediction, PredictorError> {
        let aligned = align_with_policy(raw, self.schema(), policy)?;
        let prediction = self.predictor.classify(&aligned)?;
        info!("Prediction: {} ({})", prediction.outcome, prediction.risk_percent());
        Ok(prediction)
    }
}
