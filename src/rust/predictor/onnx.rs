use std::collections::HashMap;
use std::sync::Arc;
use ort::session::Session;
use ort::value::Tensor;
use log::{debug, info};

use super::encoding::{decode_labels, decode_probabilities, FeatureEncoder};
use super::error::PredictorError;
use super::outcome::Prediction;
use super::Predictor;
use crate::artifact::ArtifactBundle;
use crate::features::{FeatureRecord, FeatureSchema};
use crate::runtime::{create_session_builder, RuntimeConfig};

/// A binary attrition classifier backed by an ONNX Runtime session.
///
/// The graph takes one f32 input of shape `[batch, features]` and produces
/// labels (output 0, i64) and class probabilities (output 1, f32 `[batch, 2]`).
///
/// # Thread Safety
///
/// The session and encoder are immutable after construction and shared
/// through `Arc`, so a predictor can be cloned into any number of threads.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use attrition::{ArtifactBundle, OnnxPredictor, Predictor, EmployeeProfile, align};
///
/// let bundle = ArtifactBundle::load("artifacts/attrition")?;
/// let predictor = OnnxPredictor::builder()
///     .with_bundle(bundle)?
///     .build()?;
///
/// let aligned = align(&EmployeeProfile::default().to_record(), predictor.schema())?;
/// let prediction = predictor.classify(&aligned)?;
/// println!("{}", prediction);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OnnxPredictor {
    model_path: String,
    input_name: String,
    session: Arc<Session>,
    encoder: Arc<FeatureEncoder>,
    schema: FeatureSchema,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<OnnxPredictor>();
    }
};

impl OnnxPredictor {
    pub fn builder() -> OnnxPredictorBuilder {
        OnnxPredictorBuilder::new()
    }

    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    /// Runs the graph once and returns labels and probabilities for every record
    fn run(&self, records: &[FeatureRecord]) -> Result<(Vec<i64>, Vec<[f32; 2]>), PredictorError> {
        let matrix = self.encoder.encode(records)?;
        debug!("Running model on input of shape {:?}", matrix.shape());

        let mut input_tensors = HashMap::new();
        input_tensors.insert(self.input_name.as_str(), Tensor::from_array(matrix)
            .map_err(|e| PredictorError::PredictionError(format!("Failed to create input tensor: {}", e)))?);

        let outputs = self.session.run(input_tensors)
            .map_err(|e| PredictorError::PredictionError(format!("Failed to run model: {}", e)))?;

        let labels = outputs[0].try_extract_tensor::<i64>()
            .map_err(|e| PredictorError::PredictionError(format!("Failed to extract label tensor: {}", e)))?;
        let labels = decode_labels(labels, records.len())?;

        let probabilities = outputs[1].try_extract_tensor::<f32>()
            .map_err(|e| PredictorError::PredictionError(format!("Failed to extract probability tensor: {}", e)))?;
        let probabilities = decode_probabilities(probabilities, records.len())?;

        Ok((labels, probabilities))
    }
}

impl Predictor for OnnxPredictor {
    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<i64>, PredictorError> {
        self.run(records).map(|(labels, _)| labels)
    }

    fn predict_proba(&self, records: &[FeatureRecord]) -> Result<Vec<[f32; 2]>, PredictorError> {
        self.run(records).map(|(_, probabilities)| probabilities)
    }

    fn classify(&self, record: &FeatureRecord) -> Result<Prediction, PredictorError> {
        let (labels, probabilities) = self.run(std::slice::from_ref(record))?;
        Prediction::from_outputs(labels[0], f64::from(probabilities[0][1]))
    }
}

/// Builds an [`OnnxPredictor`] from an artifact bundle.
#[derive(Debug, Default)]
pub struct OnnxPredictorBuilder {
    bundle: Option<ArtifactBundle>,
    runtime_config: RuntimeConfig,
}

impl OnnxPredictorBuilder {
    pub fn new() -> Self {
        Self {
            bundle: None,
            runtime_config: RuntimeConfig::default(),
        }
    }

    /// Sets the runtime configuration for ONNX model execution
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Sets the artifact bundle providing the model and its schema
    pub fn with_bundle(mut self, bundle: ArtifactBundle) -> Result<Self, PredictorError> {
        if self.bundle.is_some() {
            return Err(PredictorError::ValidationError("Artifact bundle already set".to_string()));
        }
        self.bundle = Some(bundle);
        Ok(self)
    }

    /// Loads the session, validates the graph, and builds the encoder.
    ///
    /// # Errors
    /// - `ValidationError` if no bundle was set
    /// - `ModelError` if the model fails to load, has no input matching the
    ///   manifest, or has fewer than two outputs
    pub fn build(self) -> Result<OnnxPredictor, PredictorError> {
        let bundle = self.bundle
            .ok_or_else(|| PredictorError::ValidationError("Artifact bundle must be set".to_string()))?;
        let model_path = bundle.model_path();

        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(&model_path)?;
        let input_name = Self::validate_model(&session, bundle.manifest().input_name.as_deref())?;
        info!("Model structure validated successfully (input '{}')", input_name);

        let schema = bundle.schema().clone();
        let encoder = FeatureEncoder::new(schema.clone(), &bundle.manifest().unique_values);

        Ok(OnnxPredictor {
            model_path: model_path.to_string_lossy().to_string(),
            input_name,
            session: Arc::new(session),
            encoder: Arc::new(encoder),
            schema,
        })
    }

    /// Checks the graph has the requested input and at least two outputs,
    /// returning the input name to feed.
    fn validate_model(session: &Session, wanted_input: Option<&str>) -> Result<String, PredictorError> {
        let input_name = match wanted_input {
            Some(name) => session.inputs.iter()
                .find(|i| i.name == name)
                .map(|i| i.name.clone())
                .ok_or_else(|| PredictorError::ModelError(format!("Model has no input named '{}'", name)))?,
            None => session.inputs.first()
                .map(|i| i.name.clone())
                .ok_or_else(|| PredictorError::ModelError("Model has no inputs".to_string()))?,
        };

        if session.outputs.len() < 2 {
            return Err(PredictorError::ModelError(format!(
                "Model must have 2 outputs (label, probabilities), found {}",
                session.outputs.len()
            )));
        }

        Ok(input_name)
    }
}
