use log::{debug, warn};

use super::schema::FeatureSchema;
use super::value::{FeatureRecord, FeatureValue};

/// Errors raised while aligning a raw record to a model schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlignError {
    #[error("Schema mismatch: missing field(s) {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },
}

/// What to do when the raw record cannot be aligned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignmentPolicy {
    /// Abort the request with [`AlignError::SchemaMismatch`]
    #[default]
    Strict,
    /// Log a warning and hand the raw record to the model exactly as given:
    /// no reordering and no categorical coercion
    Lenient,
}

/// Reindexes `raw` to the schema order and coerces categorical fields to strings.
///
/// Every schema field must be present in `raw`; fields outside the schema are
/// dropped. Numeric values keep their type. Aligning an aligned record yields
/// the same record.
pub fn align(raw: &FeatureRecord, schema: &FeatureSchema) -> Result<FeatureRecord, AlignError> {
    let missing: Vec<String> = schema.names()
        .iter()
        .filter(|name| !raw.contains(name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(AlignError::SchemaMismatch { missing });
    }

    let mut aligned = FeatureRecord::with_capacity(schema.len());
    for name in schema.names() {
        if let Some(value) = raw.get(name) {
            aligned.insert(name.as_str(), value.clone());
        }
    }
    coerce_categorical(&mut aligned, schema);

    debug!("Aligned {} raw field(s) to {} schema field(s)", raw.len(), aligned.len());
    Ok(aligned)
}

/// Runs [`align`] and applies `policy` when it fails.
pub fn align_with_policy(
    raw: &FeatureRecord,
    schema: &FeatureSchema,
    policy: AlignmentPolicy,
) -> Result<FeatureRecord, AlignError> {
    match (align(raw, schema), policy) {
        (Ok(aligned), _) => Ok(aligned),
        (Err(e), AlignmentPolicy::Strict) => Err(e),
        (Err(e), AlignmentPolicy::Lenient) => {
            warn!("Feature alignment note: {}; continuing with unaligned input", e);
            Ok(raw.clone())
        }
    }
}

fn coerce_categorical(record: &mut FeatureRecord, schema: &FeatureSchema) {
    for name in schema.categorical() {
        if let Some(value) = record.get_mut(name) {
            if !matches!(value, FeatureValue::Text(_)) {
                *value = FeatureValue::Text(value.to_category());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(["Age", "Department", "JobRole", "OverTime"], ["Department", "JobRole"])
    }

    #[test]
    fn test_reorders_to_schema() {
        let raw = FeatureRecord::new()
            .with("OverTime", 1i64)
            .with("JobRole", "Sales Executive")
            .with("Age", 30i64)
            .with("Department", "Sales");

        let aligned = align(&raw, &schema()).unwrap();
        assert_eq!(
            aligned.names().collect::<Vec<_>>(),
            vec!["Age", "Department", "JobRole", "OverTime"]
        );
        assert_eq!(aligned.get("OverTime"), Some(&FeatureValue::Int(1)));
    }

    #[test]
    fn test_reports_every_missing_field() {
        let raw = FeatureRecord::new().with("Age", 30i64);
        let err = align(&raw, &schema()).unwrap_err();
        assert_eq!(
            err,
            AlignError::SchemaMismatch {
                missing: vec!["Department".into(), "JobRole".into(), "OverTime".into()]
            }
        );
        assert!(err.to_string().contains("Department, JobRole, OverTime"));
    }

    #[test]
    fn test_drops_extra_fields() {
        let raw = FeatureRecord::new()
            .with("Age", 30i64)
            .with("Department", "Sales")
            .with("JobRole", "Manager")
            .with("OverTime", 0i64)
            .with("EmployeeNumber", 1234i64);
        let aligned = align(&raw, &schema()).unwrap();
        assert!(!aligned.contains("EmployeeNumber"));
        assert_eq!(aligned.len(), 4);
    }

    #[test]
    fn test_lenient_passes_raw_through() {
        let raw = FeatureRecord::new()
            .with("OverTime", 1i64)
            .with("Department", 3i64);
        let out = align_with_policy(&raw, &schema(), AlignmentPolicy::Lenient).unwrap();
        assert_eq!(out.names().collect::<Vec<_>>(), vec!["OverTime", "Department"]);
        assert_eq!(out, raw);
        assert_eq!(out.get("Department"), Some(&FeatureValue::Int(3)));

        assert!(align_with_policy(&raw, &schema(), AlignmentPolicy::Strict).is_err());
    }
}
