use ort::Error as OrtError;
use std::fmt;

use crate::artifact::ArtifactError;
use crate::features::AlignError;

/// Represents the different types of errors that can occur while serving a prediction.
#[derive(Debug)]
pub enum PredictorError {
    /// The artifact bundle could not be loaded
    ArtifactError(ArtifactError),
    /// The ONNX model could not be loaded or has an unexpected structure
    ModelError(String),
    /// The raw record could not be aligned to the model schema
    AlignmentError(AlignError),
    /// The model rejected the record or returned unusable output
    PredictionError(String),
    /// Invalid input parameters
    ValidationError(String),
}

impl fmt::Display for PredictorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArtifactError(e) => write!(f, "Artifact load error: {}", e),
            Self::ModelError(msg) => write!(f, "Model error: {}", msg),
            Self::AlignmentError(e) => write!(f, "Feature alignment error: {}", e),
            Self::PredictionError(msg) => write!(f, "Prediction error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for PredictorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ArtifactError(e) => Some(e),
            Self::AlignmentError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<OrtError> for PredictorError {
    fn from(err: OrtError) -> Self {
        PredictorError::ModelError(err.to_string())
    }
}

impl From<ArtifactError> for PredictorError {
    fn from(err: ArtifactError) -> Self {
        PredictorError::ArtifactError(err)
    }
}

impl From<AlignError> for PredictorError {
    fn from(err: AlignError) -> Self {
        PredictorError::AlignmentError(err)
    }
}
