//! Trained model bundles: manifest parsing, validation, and the local store.

use std::io;

mod manifest;
mod store;

pub use manifest::{ArtifactBundle, Manifest, DEFAULT_MODEL_FILE, MANIFEST_FILE};
pub use store::{ArtifactSource, ArtifactStore, DEFAULT_BUNDLE, STORE_ENV};

/// Failures while locating, verifying, or reading an artifact bundle.
///
/// Any of these at startup means the process must not serve predictions.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact file not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("Invalid artifact: {0}")]
    Invalid(String),
    #[error("Download error: {0}")]
    Download(#[from] reqwest::Error),
    #[error("Artifact verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}
