use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use attrition::{
    align, AlignmentPolicy, ArtifactBundle, Attrition, EmployeeProfile, OnnxPredictor,
    PredictionContext, Predictor, PredictorError, RuntimeConfig,
};
use serde_json::json;

// Two-output graph over the 19 training features: p(leave) = 0.25 + 0.5 * OverTime,
// label = argmax of [p(stay), p(leave)].
fn fixture_model() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/overtime.onnx")
}

const FEATURES: [&str; 19] = [
    "Age", "Department", "DistanceFromHome", "EnvironmentSatisfaction", "HourlyRate",
    "JobInvolvement", "JobLevel", "JobRole", "JobSatisfaction", "MonthlyIncome",
    "NumCompaniesWorked", "OverTime", "PercentSalaryHike", "RelationshipSatisfaction",
    "StockOptionLevel", "TrainingTimesLastYear", "WorkLifeBalance",
    "YearsSinceLastPromotion", "YearsWithCurrManager",
];

fn manifest() -> serde_json::Value {
    json!({
        "name": "overtime",
        "feature_names": FEATURES,
        "cat_features": ["Department", "JobRole"],
        "unique_values": {
            "Department": ["Sales", "Research & Development", "Human Resources"],
            "JobRole": ["Sales Executive", "Research Scientist", "Manager"]
        }
    })
}

fn write_bundle(dir: &Path, manifest: serde_json::Value) {
    fs::write(dir.join("manifest.json"), manifest.to_string()).unwrap();
    fs::copy(fixture_model(), dir.join("model.onnx")).unwrap();
}

fn setup_context(manifest: serde_json::Value) -> (tempfile::TempDir, PredictionContext) {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    write_bundle(tmp.path(), manifest);
    let context = PredictionContext::load(tmp.path(), RuntimeConfig::default())
        .expect("Failed to load prediction context");
    (tmp, context)
}

#[test]
fn test_build_requires_bundle() {
    assert!(matches!(OnnxPredictor::builder().build(), Err(PredictorError::ValidationError(_))));
}

#[test]
fn test_unknown_input_name_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let mut m = manifest();
    m["input_name"] = json!("tabular");
    write_bundle(tmp.path(), m);

    let bundle = ArtifactBundle::load(tmp.path()).unwrap();
    let err = OnnxPredictor::builder().with_bundle(bundle).unwrap().build().unwrap_err();
    assert!(matches!(err, PredictorError::ModelError(_)));
    assert!(err.to_string().contains("tabular"));
}

#[test]
fn test_named_input_accepted() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let mut m = manifest();
    m["input_name"] = json!("features");
    write_bundle(tmp.path(), m);

    let predictor = OnnxPredictor::builder()
        .with_bundle(ArtifactBundle::load(tmp.path())?)?
        .build()?;
    assert!(predictor.model_path().ends_with("model.onnx"));
    assert_eq!(predictor.schema().len(), 19);
    Ok(())
}

#[test]
fn test_classify_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, context) = setup_context(manifest());

    let stay = context.predict_profile(&EmployeeProfile::default(), AlignmentPolicy::Strict)?;
    assert_eq!(stay.outcome, Attrition::Stay);
    assert_eq!(stay.risk_percent(), "25.00%");

    let profile = EmployeeProfile { over_time: true, ..Default::default() };
    let leave = context.predict_profile(&profile, AlignmentPolicy::Strict)?;
    assert_eq!(leave.outcome, Attrition::Leave);
    assert_eq!(leave.risk_percent(), "75.00%");
    Ok(())
}

#[test]
fn test_batch_labels_and_probabilities() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    write_bundle(tmp.path(), manifest());
    let predictor = OnnxPredictor::builder()
        .with_bundle(ArtifactBundle::load(tmp.path())?)?
        .build()?;

    let records = [false, true, false]
        .into_iter()
        .map(|over_time| {
            let profile = EmployeeProfile { over_time, ..Default::default() };
            align(&profile.to_record(), predictor.schema())
        })
        .collect::<Result<Vec<_>, _>>()?;

    assert_eq!(predictor.predict(&records)?, vec![0, 1, 0]);
    assert_eq!(
        predictor.predict_proba(&records)?,
        vec![[0.75, 0.25], [0.25, 0.75], [0.75, 0.25]]
    );
    Ok(())
}

#[test]
fn test_unseen_category_still_scored() -> Result<(), Box<dyn std::error::Error>> {
    let (_tmp, context) = setup_context(manifest());
    let profile = EmployeeProfile { job_role: "Healthcare Representative".into(), ..Default::default() };

    let prediction = context.predict_profile(&profile, AlignmentPolicy::Strict)?;
    assert_eq!(prediction.outcome, Attrition::Stay);
    Ok(())
}

#[test]
fn test_unlisted_categories_use_fallback_choices() -> Result<(), Box<dyn std::error::Error>> {
    let mut m = manifest();
    m["unique_values"] = json!({});
    let (_tmp, context) = setup_context(m);

    assert_eq!(context.choices("JobRole")[0], "Sales Executive");
    let prediction = context.predict_profile(&EmployeeProfile::default(), AlignmentPolicy::Strict)?;
    assert_eq!(prediction.outcome, Attrition::Stay);
    Ok(())
}

#[test]
fn test_shared_across_threads() {
    let (_tmp, context) = setup_context(manifest());
    let mut handles = vec![];

    for i in 0..4 {
        let context = context.clone();
        handles.push(thread::spawn(move || {
            let profile = EmployeeProfile { over_time: i % 2 == 1, ..Default::default() };
            context.predict_profile(&profile, AlignmentPolicy::Strict).map(|p| p.outcome)
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let expected = if i % 2 == 1 { Attrition::Leave } else { Attrition::Stay };
        assert_eq!(handle.join().unwrap().unwrap(), expected);
    }
}
