use std::ops::RangeInclusive;

use super::value::{FeatureRecord, FeatureValue};

/// Fixed values for schema fields the input form does not expose.
pub const DEFAULT_VALUES: &[(&str, i64)] = &[
    ("JobSatisfaction", 2),
];

/// Department choices used when the artifact does not list any
pub const FALLBACK_DEPARTMENTS: &[&str] = &["Sales", "Research & Development", "Human Resources"];

/// Job role choices used when the artifact does not list any
pub const FALLBACK_JOB_ROLES: &[&str] = &["Sales Executive", "Research Scientist", "Laboratory Technician"];

/// A bounded integer input on the form.
#[derive(Debug, Clone)]
pub struct NumericInput {
    /// Schema field the input feeds
    pub field: &'static str,
    /// Human-readable label
    pub label: &'static str,
    pub range: RangeInclusive<i64>,
    pub default: i64,
}

const fn input(field: &'static str, label: &'static str, min: i64, max: i64, default: i64) -> NumericInput {
    NumericInput { field, label, range: min..=max, default }
}

/// Every numeric input the form exposes, in form order.
pub const NUMERIC_INPUTS: &[NumericInput] = &[
    input("Age", "Age", 18, 70, 30),
    input("DistanceFromHome", "Distance From Home (km)", 1, 30, 10),
    input("EnvironmentSatisfaction", "Environment Satisfaction", 1, 4, 2),
    input("RelationshipSatisfaction", "Relationship Satisfaction", 1, 4, 2),
    input("HourlyRate", "Hourly Rate", 30, 100, 65),
    input("MonthlyIncome", "Monthly Income ($)", 1000, 20000, 5000),
    input("NumCompaniesWorked", "Num Companies Worked", 0, 10, 2),
    input("JobInvolvement", "Job Involvement", 1, 4, 2),
    input("JobLevel", "Job Level", 1, 5, 3),
    input("PercentSalaryHike", "Salary Hike (%)", 10, 25, 15),
    input("StockOptionLevel", "Stock Option Level", 0, 3, 1),
    input("TrainingTimesLastYear", "Training Times Last Year", 0, 6, 2),
    input("WorkLifeBalance", "Work Life Balance", 1, 4, 2),
    input("YearsSinceLastPromotion", "Years Since Last Promotion", 0, 15, 3),
    input("YearsWithCurrManager", "Years With Current Manager", 0, 15, 3),
];

pub fn numeric_input(field: &str) -> Option<&'static NumericInput> {
    NUMERIC_INPUTS.iter().find(|i| i.field == field)
}

/// The employee attributes collected for one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeProfile {
    pub age: i64,
    pub distance_from_home: i64,
    pub environment_satisfaction: i64,
    pub relationship_satisfaction: i64,
    pub hourly_rate: i64,
    pub monthly_income: i64,
    pub num_companies_worked: i64,
    pub job_involvement: i64,
    pub job_level: i64,
    pub department: String,
    pub job_role: String,
    pub over_time: bool,
    pub percent_salary_hike: i64,
    pub stock_option_level: i64,
    pub training_times_last_year: i64,
    pub work_life_balance: i64,
    pub years_since_last_promotion: i64,
    pub years_with_curr_manager: i64,
}

impl Default for EmployeeProfile {
    fn default() -> Self {
        let default_of = |field| numeric_input(field).map(|i| i.default).unwrap_or_default();
        Self {
            age: default_of("Age"),
            distance_from_home: default_of("DistanceFromHome"),
            environment_satisfaction: default_of("EnvironmentSatisfaction"),
            relationship_satisfaction: default_of("RelationshipSatisfaction"),
            hourly_rate: default_of("HourlyRate"),
            monthly_income: default_of("MonthlyIncome"),
            num_companies_worked: default_of("NumCompaniesWorked"),
            job_involvement: default_of("JobInvolvement"),
            job_level: default_of("JobLevel"),
            department: FALLBACK_DEPARTMENTS[0].to_string(),
            job_role: FALLBACK_JOB_ROLES[0].to_string(),
            over_time: false,
            percent_salary_hike: default_of("PercentSalaryHike"),
            stock_option_level: default_of("StockOptionLevel"),
            training_times_last_year: default_of("TrainingTimesLastYear"),
            work_life_balance: default_of("WorkLifeBalance"),
            years_since_last_promotion: default_of("YearsSinceLastPromotion"),
            years_with_curr_manager: default_of("YearsWithCurrManager"),
        }
    }
}

impl EmployeeProfile {
    fn numeric_fields(&self) -> [(&'static str, i64); 15] {
        [
            ("Age", self.age),
            ("DistanceFromHome", self.distance_from_home),
            ("EnvironmentSatisfaction", self.environment_satisfaction),
            ("RelationshipSatisfaction", self.relationship_satisfaction),
            ("HourlyRate", self.hourly_rate),
            ("MonthlyIncome", self.monthly_income),
            ("NumCompaniesWorked", self.num_companies_worked),
            ("JobInvolvement", self.job_involvement),
            ("JobLevel", self.job_level),
            ("PercentSalaryHike", self.percent_salary_hike),
            ("StockOptionLevel", self.stock_option_level),
            ("TrainingTimesLastYear", self.training_times_last_year),
            ("WorkLifeBalance", self.work_life_balance),
            ("YearsSinceLastPromotion", self.years_since_last_promotion),
            ("YearsWithCurrManager", self.years_with_curr_manager),
        ]
    }

    /// Checks every numeric input against its allowed range and that the
    /// categorical selections are non-empty.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in self.numeric_fields() {
            if let Some(input) = numeric_input(field) {
                if !input.range.contains(&value) {
                    return Err(format!(
                        "{} must be between {} and {}, got {}",
                        input.label, input.range.start(), input.range.end(), value
                    ));
                }
            }
        }
        if self.department.trim().is_empty() {
            return Err("Department cannot be empty".to_string());
        }
        if self.job_role.trim().is_empty() {
            return Err("Job Role cannot be empty".to_string());
        }
        Ok(())
    }

    /// Flattens the profile into a raw record, defaults table first.
    ///
    /// The overtime toggle is emitted as the integer 0 or 1, which is how the
    /// model was trained.
    pub fn to_record(&self) -> FeatureRecord {
        let mut record = FeatureRecord::with_capacity(DEFAULT_VALUES.len() + 18);
        for (field, value) in DEFAULT_VALUES {
            record.insert(*field, FeatureValue::Int(*value));
        }
        for (field, value) in self.numeric_fields() {
            record.insert(field, value);
        }
        record.insert("Department", self.department.as_str());
        record.insert("JobRole", self.job_role.as_str());
        record.insert("OverTime", i64::from(self.over_time));
        record
    }
}
