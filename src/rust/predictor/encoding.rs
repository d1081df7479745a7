use std::collections::{BTreeMap, HashMap};
use log::{debug, warn};
use ndarray::{Array2, ArrayViewD};

use super::error::PredictorError;
use crate::features::{FeatureRecord, FeatureSchema, FeatureValue};

/// Code fed to the graph for a category it was not given a value list for.
pub const MISSING_CATEGORY: f32 = f32::NAN;

/// Turns aligned records into the numeric matrix the ONNX graph consumes.
///
/// Numeric fields pass through as f32, booleans become 0/1, and categorical
/// strings become their index in the artifact's value list. Values outside
/// that list, and fields with no list at all, become [`MISSING_CATEGORY`].
/// The value lists only populate choices; nothing is rejected against them.
#[derive(Debug, Clone)]
pub(crate) struct FeatureEncoder {
    schema: FeatureSchema,
    codes: HashMap<String, HashMap<String, usize>>,
}

impl FeatureEncoder {
    pub(crate) fn new(schema: FeatureSchema, values: &BTreeMap<String, Vec<String>>) -> Self {
        let mut codes = HashMap::new();
        for field in schema.categorical() {
            let table: HashMap<String, usize> = match values.get(field) {
                Some(known) => known.iter().enumerate().map(|(i, v)| (v.clone(), i)).collect(),
                None => {
                    warn!("No category list for '{}'; every value will be encoded as missing", field);
                    HashMap::new()
                }
            };
            codes.insert(field.clone(), table);
        }
        Self { schema, codes }
    }

    pub(crate) fn width(&self) -> usize {
        self.schema.len()
    }

    /// Encodes `records` into a `[records.len(), width]` matrix.
    ///
    /// Each record must carry exactly the schema fields in schema order.
    pub(crate) fn encode(&self, records: &[FeatureRecord]) -> Result<Array2<f32>, PredictorError> {
        if records.is_empty() {
            return Err(PredictorError::ValidationError("no records to predict".into()));
        }
        let width = self.width();
        let mut data = Vec::with_capacity(records.len() * width);
        for (row, record) in records.iter().enumerate() {
            self.check_fields(row, record)?;
            for (name, value) in record.iter() {
                data.push(self.encode_value(name, value)?);
            }
        }
        Array2::from_shape_vec((records.len(), width), data)
            .map_err(|e| PredictorError::PredictionError(format!("Failed to create input array: {}", e)))
    }

    fn check_fields(&self, row: usize, record: &FeatureRecord) -> Result<(), PredictorError> {
        let names: Vec<&str> = record.names().collect();
        if names.len() != self.width() || names.iter().zip(self.schema.names()).any(|(a, b)| *a != b.as_str()) {
            return Err(PredictorError::PredictionError(format!(
                "record {} fields [{}] do not match model features [{}]",
                row,
                names.join(", "),
                self.schema.names().join(", ")
            )));
        }
        Ok(())
    }

    fn encode_value(&self, name: &str, value: &FeatureValue) -> Result<f32, PredictorError> {
        match self.codes.get(name) {
            Some(table) => {
                let text = value.as_str().ok_or_else(|| PredictorError::PredictionError(format!(
                    "categorical feature '{}' must be a string, got {}", name, value.kind()
                )))?;
                Ok(match table.get(text) {
                    Some(&code) => code as f32,
                    None => {
                        debug!("Unseen value '{}' for '{}' encoded as missing", text, name);
                        MISSING_CATEGORY
                    }
                })
            }
            None => value.as_f64().map(|v| v as f32).ok_or_else(|| {
                PredictorError::PredictionError(format!(
                    "numeric feature '{}' got {} value '{}'", name, value.kind(), value
                ))
            }),
        }
    }
}

/// Reads per-record class probabilities from a model output.
///
/// Accepts `[n, 2]` (stay, leave) or `[n]` / `[n, 1]` (leave only).
pub(crate) fn decode_probabilities(
    output: ArrayViewD<'_, f32>,
    rows: usize,
) -> Result<Vec<[f32; 2]>, PredictorError> {
    let shape = output.shape().to_vec();
    let values: Vec<f32> = output.iter().copied().collect();
    let probs = match shape.as_slice() {
        [n, 2] if *n == rows => values.chunks(2).map(|c| [c[0], c[1]]).collect(),
        [n] | [n, 1] if *n == rows => values.iter().map(|&p| [1.0 - p, p]).collect(),
        _ => {
            return Err(PredictorError::PredictionError(format!(
                "unexpected probability output shape {:?} for {} record(s)", shape, rows
            )))
        }
    };
    Ok(probs)
}

/// Reads per-record labels from a model output of shape `[n]` or `[n, 1]`.
pub(crate) fn decode_labels(output: ArrayViewD<'_, i64>, rows: usize) -> Result<Vec<i64>, PredictorError> {
    if output.len() != rows {
        return Err(PredictorError::PredictionError(format!(
            "unexpected label output shape {:?} for {} record(s)", output.shape(), rows
        )));
    }
    Ok(output.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn encoder() -> FeatureEncoder {
        let schema = FeatureSchema::new(["Age", "Department", "OverTime"], ["Department"]);
        let values = BTreeMap::from([(
            "Department".to_string(),
            vec!["Human Resources".to_string(), "Sales".to_string()],
        )]);
        FeatureEncoder::new(schema, &values)
    }

    fn record() -> FeatureRecord {
        FeatureRecord::new()
            .with("Age", 30i64)
            .with("Department", "Sales")
            .with("OverTime", true)
    }

    #[test]
    fn test_encodes_row() {
        let matrix = encoder().encode(&[record()]).unwrap();
        assert_eq!(matrix, arr2(&[[30.0, 1.0, 1.0]]));
    }

    #[test]
    fn test_unseen_category_encoded_as_missing() {
        let r = record().with("Department", "Marketing");
        let matrix = encoder().encode(&[r]).unwrap();
        assert_eq!(matrix[[0, 0]], 30.0);
        assert!(matrix[[0, 1]].is_nan());
        assert_eq!(matrix[[0, 2]], 1.0);
    }

    #[test]
    fn test_rejects_non_text_category() {
        let r = record().with("Department", 2i64);
        assert!(matches!(encoder().encode(&[r]), Err(PredictorError::PredictionError(_))));
    }

    #[test]
    fn test_rejects_misordered_record() {
        let r = FeatureRecord::new()
            .with("Department", "Sales")
            .with("Age", 30i64)
            .with("OverTime", 0i64);
        assert!(matches!(encoder().encode(&[r]), Err(PredictorError::PredictionError(_))));
    }

    #[test]
    fn test_rejects_text_in_numeric_field() {
        let r = record().with("Age", "thirty");
        assert!(encoder().encode(&[r]).is_err());
    }

    #[test]
    fn test_unlisted_category_field_encoded_as_missing() {
        let schema = FeatureSchema::new(["JobRole"], ["JobRole"]);
        let encoder = FeatureEncoder::new(schema, &BTreeMap::new());
        let matrix = encoder.encode(&[FeatureRecord::new().with("JobRole", "Manager")]).unwrap();
        assert!(matrix[[0, 0]].is_nan());
    }

    #[test]
    fn test_decode_probabilities() {
        let two = arr2(&[[0.27f32, 0.73], [0.9, 0.1]]).into_dyn();
        assert_eq!(decode_probabilities(two.view(), 2).unwrap(), vec![[0.27, 0.73], [0.9, 0.1]]);

        let one = arr1(&[0.25f32]).into_dyn();
        assert_eq!(decode_probabilities(one.view(), 1).unwrap(), vec![[0.75, 0.25]]);

        assert!(decode_probabilities(two.view(), 3).is_err());
    }

    #[test]
    fn test_decode_labels() {
        let labels = arr1(&[0i64, 1]).into_dyn();
        assert_eq!(decode_labels(labels.view(), 2).unwrap(), vec![0, 1]);
        assert!(decode_labels(labels.view(), 1).is_err());
    }
}
