use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ArtifactError;
use crate::features::FeatureSchema;
use crate::features::profile::{FALLBACK_DEPARTMENTS, FALLBACK_JOB_ROLES};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const DEFAULT_MODEL_FILE: &str = "model.onnx";

fn default_model_file() -> String {
    DEFAULT_MODEL_FILE.to_string()
}

/// The JSON description shipped next to a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    #[serde(default = "default_model_file")]
    pub model_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_sha256: Option<String>,
    /// Feature names in training order
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub cat_features: Vec<String>,
    /// Known values per categorical field
    #[serde(default)]
    pub unique_values: BTreeMap<String, Vec<String>>,
    /// ONNX input name; the first graph input is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_name: Option<String>,
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.display().to_string()));
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema::new(self.feature_names.iter().cloned(), self.cat_features.iter().cloned())
    }

    /// Validates the manifest's internal consistency
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.name.trim().is_empty() {
            return Err(ArtifactError::Invalid("manifest name cannot be empty".into()));
        }
        if self.model_file.trim().is_empty() {
            return Err(ArtifactError::Invalid("model_file cannot be empty".into()));
        }
        // The model must live directly inside the bundle directory
        let mut components = Path::new(&self.model_file).components();
        if !matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) {
            return Err(ArtifactError::Invalid(format!(
                "model_file '{}' must be a file name inside the bundle directory",
                self.model_file
            )));
        }
        self.schema().check().map_err(ArtifactError::Invalid)?;
        for (field, values) in &self.unique_values {
            if !self.cat_features.contains(field) {
                log::warn!("unique_values lists '{}' which is not a categorical feature", field);
            }
            if values.is_empty() {
                return Err(ArtifactError::Invalid(format!("no values listed for '{}'", field)));
            }
        }
        Ok(())
    }
}

/// A loaded, validated artifact bundle: the manifest plus the resolved model path.
///
/// Bundles are read once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    dir: PathBuf,
    manifest: Manifest,
    schema: FeatureSchema,
}

impl ArtifactBundle {
    /// Loads the bundle in `dir`, validating the manifest and, when the
    /// manifest declares one, the model file's SHA-256.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref().to_path_buf();
        log::info!("Loading artifact bundle from {:?}", dir);

        let manifest = Manifest::from_file(&dir.join(MANIFEST_FILE))?;
        manifest.validate()?;

        let model_path = dir.join(&manifest.model_file);
        if !model_path.exists() {
            return Err(ArtifactError::NotFound(model_path.display().to_string()));
        }
        if let Some(expected) = &manifest.model_sha256 {
            let actual = sha256_file(&model_path)?;
            if !actual.eq_ignore_ascii_case(expected) {
                log::error!("Model hash mismatch: expected {}, got {}", expected, actual);
                return Err(ArtifactError::HashMismatch {
                    file_type: "model".to_string(),
                    expected: expected.clone(),
                    actual,
                });
            }
            log::info!("Model hash verified");
        }

        let schema = manifest.schema();
        log::info!(
            "Artifact '{}' loaded: {} features ({} categorical)",
            manifest.name, schema.len(), schema.categorical().len()
        );
        Ok(Self { dir, manifest, schema })
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.manifest.model_file)
    }

    /// Valid choices for a categorical field.
    ///
    /// Department and JobRole fall back to built-in lists when the artifact
    /// does not name their values.
    pub fn choices(&self, field: &str) -> Vec<String> {
        if let Some(values) = self.manifest.unique_values.get(field) {
            return values.clone();
        }
        let fallback: &[&str] = match field {
            "Department" => FALLBACK_DEPARTMENTS,
            "JobRole" => FALLBACK_JOB_ROLES,
            _ => &[],
        };
        fallback.iter().map(|s| s.to_string()).collect()
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub(crate) fn sha256_file(path: &Path) -> Result<String, ArtifactError> {
    let bytes = fs::read(path)?;
    log::debug!("Hashing {} bytes from {:?}", bytes.len(), path);
    Ok(sha256_hex(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Manifest {
        Manifest {
            name: "attrition".into(),
            model_file: DEFAULT_MODEL_FILE.into(),
            model_sha256: None,
            feature_names: vec!["Age".into(), "Department".into()],
            cat_features: vec!["Department".into()],
            unique_values: BTreeMap::from([("Department".to_string(), vec!["Sales".to_string()])]),
            input_name: None,
        }
    }

    #[test]
    fn test_manifest_defaults() {
        let json = r#"{"name": "m", "feature_names": ["Age"]}"#;
        let parsed: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.model_file, "model.onnx");
        assert!(parsed.cat_features.is_empty());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_manifest_rejects_empty_value_list() {
        let mut m = manifest();
        m.unique_values.insert("Department".into(), vec![]);
        assert!(matches!(m.validate(), Err(ArtifactError::Invalid(_))));
    }

    #[test]
    fn test_manifest_rejects_unknown_categorical() {
        let mut m = manifest();
        m.cat_features.push("JobRole".into());
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_manifest_rejects_model_file_outside_bundle() {
        for path in ["../outside.onnx", "/tmp/outside.onnx", "nested/model.onnx", "..", "."] {
            let mut m = manifest();
            m.model_file = path.into();
            assert!(matches!(m.validate(), Err(ArtifactError::Invalid(_))), "{} accepted", path);
        }

        let mut m = manifest();
        m.model_file = "attrition-v2.onnx".into();
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
