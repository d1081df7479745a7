use std::fmt;
use serde::{Deserialize, Serialize};

use super::error::PredictorError;

/// The two classes the model separates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attrition {
    Stay,
    Leave,
}

impl Attrition {
    /// Maps a model label (0 = stay, 1 = leave) to a class
    pub fn from_label(label: i64) -> Result<Self, PredictorError> {
        match label {
            0 => Ok(Self::Stay),
            1 => Ok(Self::Leave),
            other => Err(PredictorError::PredictionError(format!(
                "model returned label {}, expected 0 or 1", other
            ))),
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::Stay => "Employee is likely to STAY",
            Self::Leave => "Employee is at risk of LEAVING",
        }
    }
}

impl fmt::Display for Attrition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stay => write!(f, "stay"),
            Self::Leave => write!(f, "leave"),
        }
    }
}

/// A classified record: the predicted class and the probability of leaving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub outcome: Attrition,
    /// Probability of the leave class, in [0, 1]
    pub probability: f64,
}

impl Prediction {
    /// Builds a prediction from a raw label and leave-class probability
    pub fn from_outputs(label: i64, leave_probability: f64) -> Result<Self, PredictorError> {
        let outcome = Attrition::from_label(label)?;
        if !(0.0..=1.0).contains(&leave_probability) {
            return Err(PredictorError::PredictionError(format!(
                "probability {} is outside [0, 1]", leave_probability
            )));
        }
        Ok(Self { outcome, probability: leave_probability })
    }

    /// Risk probability as a percentage with two decimals, e.g. `73.00%`
    pub fn risk_percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (risk probability {})", self.outcome.headline(), self.risk_percent())
    }
}
