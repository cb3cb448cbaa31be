use serde::{Deserialize, Serialize};

/// Clinical inputs for a heart-disease risk assessment.
///
/// Every field is a plain number so the scorer can run directly on decoded
/// JSON. Categorical fields keep their numeric codes (`cp` 0-3, `thal` 0-3,
/// ...); values outside the documented ranges fall into the "else" bucket
/// of the corresponding rule instead of being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RiskInput {
    /// Age in years
    pub age: f64,
    /// 0 = female, 1 = male
    pub sex: f64,
    /// Chest pain type (0 typical angina .. 3 asymptomatic)
    pub cp: f64,
    /// Resting blood pressure (mm Hg)
    pub trestbps: f64,
    /// Serum cholesterol (mg/dl)
    pub chol: f64,
    /// Fasting blood sugar > 120 mg/dl
    pub fbs: f64,
    /// Resting ECG result (0-2)
    pub restecg: f64,
    /// Maximum heart rate achieved
    pub thalach: f64,
    /// Exercise induced angina
    pub exang: f64,
    /// ST depression induced by exercise relative to rest
    pub oldpeak: f64,
    /// Slope of the peak exercise ST segment (0-2)
    pub slope: f64,
    /// Number of major vessels colored by fluoroscopy
    pub ca: f64,
    /// Thalassemia (0-3)
    pub thal: f64,
}

/// Risk category derived from the normalised probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum RiskCategory {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskCategory {
    pub const HIGH_THRESHOLD: u8 = 70;
    pub const MEDIUM_THRESHOLD: u8 = 40;

    pub fn from_probability(probability: u8) -> Self {
        match probability {
            p if p >= Self::HIGH_THRESHOLD => RiskCategory::High,
            p if p >= Self::MEDIUM_THRESHOLD => RiskCategory::Medium,
            _ => RiskCategory::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low Risk",
            RiskCategory::Medium => "Medium Risk",
            RiskCategory::High => "High Risk",
        }
    }

    /// Sentence shown to the user alongside the category.
    pub fn message(&self) -> String {
        format!(
            "Based on the provided data, the patient has {} of heart disease.",
            self.as_str().to_lowercase()
        )
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subset of the input echoed back with human-readable labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RiskFactors {
    pub age: f64,
    pub sex: String,
    pub cholesterol: f64,
    pub blood_pressure: f64,
    pub max_heart_rate: f64,
    pub chest_pain_type: String,
}

/// Result of scoring a [`RiskInput`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RiskOutput {
    pub prediction: RiskCategory,
    /// Normalised probability, always within 5..=99
    pub probability: u8,
    pub message: String,
    /// Raw accumulated points
    pub risk_score: i64,
    pub factors: RiskFactors,
    /// Triggered rule labels in evaluation order, or the sentinel label
    pub key_risk_factors: Vec<String>,
}

/// Per-rule point contributions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub age: f64,
    pub sex: f64,
    pub chest_pain: f64,
    pub blood_pressure: f64,
    pub cholesterol: f64,
    pub fasting_blood_sugar: f64,
    pub resting_ecg: f64,
    pub max_heart_rate: f64,
    pub exercise_angina: f64,
    pub st_depression: f64,
    pub slope: f64,
    pub vessels: f64,
    pub thalassemia: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        [
            self.age,
            self.sex,
            self.chest_pain,
            self.blood_pressure,
            self.cholesterol,
            self.fasting_blood_sugar,
            self.resting_ecg,
            self.max_heart_rate,
            self.exercise_angina,
            self.st_depression,
            self.slope,
            self.vessels,
            self.thalassemia,
        ]
        .iter()
        .sum()
    }
}
