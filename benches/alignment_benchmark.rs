use criterion::{black_box, criterion_group, criterion_main, Criterion};
use attrition::{align, align_with_policy, AlignmentPolicy, EmployeeProfile, FeatureRecord, FeatureSchema};

fn training_schema() -> FeatureSchema {
    FeatureSchema::new(
        [
            "Age", "Department", "DistanceFromHome", "EnvironmentSatisfaction", "HourlyRate",
            "JobInvolvement", "JobLevel", "JobRole", "JobSatisfaction", "MonthlyIncome",
            "NumCompaniesWorked", "OverTime", "PercentSalaryHike", "RelationshipSatisfaction",
            "StockOptionLevel", "TrainingTimesLastYear", "WorkLifeBalance",
            "YearsSinceLastPromotion", "YearsWithCurrManager",
        ],
        ["Department", "JobRole"],
    )
}

fn bench_alignment(c: &mut Criterion) {
    let schema = training_schema();
    let raw = EmployeeProfile::default().to_record();
    let mut group = c.benchmark_group("Alignment");

    group.sample_size(200);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("profile_to_record", |b| {
        let profile = EmployeeProfile::default();
        b.iter(|| black_box(&profile).to_record())
    });

    group.bench_function("align_full_record", |b| {
        b.iter(|| align(black_box(&raw), black_box(&schema)))
    });

    let partial: FeatureRecord = EmployeeProfile::default().to_record().iter()
        .filter(|(name, _)| *name != "JobSatisfaction")
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    group.bench_function("align_lenient_mismatch", |b| {
        b.iter(|| align_with_policy(black_box(&partial), black_box(&schema), AlignmentPolicy::Lenient))
    });

    group.finish();
}

criterion_group!(benches, bench_alignment);
criterion_main!(benches);
