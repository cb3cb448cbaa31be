//! Weighted point scoring for heart-disease risk.
//!
//! Each clinical input contributes points independently; the sum is
//! normalised against [`MAX_SCORE`] into a clamped probability and then
//! bucketed into a [`RiskCategory`].

use crate::models::{RiskCategory, RiskFactors, RiskInput, RiskOutput, ScoreBreakdown};

/// Practical upper bound of the weight table, used for normalisation.
pub const MAX_SCORE: f64 = 145.0;

/// Probability never drops below this, some risk always exists.
pub const MIN_PROBABILITY: u8 = 5;

/// Probability never reaches certainty.
pub const MAX_PROBABILITY: u8 = 99;

pub const NO_RISK_FACTORS: &str = "No major risk factors identified";

const CHEST_PAIN_TYPES: [&str; 4] = [
    "Typical Angina",
    "Atypical Angina",
    "Non-anginal Pain",
    "Asymptomatic",
];

/// Score a validated input.
pub fn score(input: &RiskInput) -> RiskOutput {
    let raw = breakdown(input).total();
    let probability = probability_from_score(raw);
    let prediction = RiskCategory::from_probability(probability);

    RiskOutput {
        prediction,
        probability,
        message: prediction.message(),
        risk_score: round_half_up(raw) as i64,
        factors: RiskFactors {
            age: input.age,
            sex: sex_label(input.sex).to_string(),
            cholesterol: input.chol,
            blood_pressure: input.trestbps,
            max_heart_rate: input.thalach,
            chest_pain_type: chest_pain_label(input.cp).to_string(),
        },
        key_risk_factors: key_risk_factors(input)
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

/// Points contributed by every rule of the weight table.
pub fn breakdown(input: &RiskInput) -> ScoreBreakdown {
    ScoreBreakdown {
        age: age_points(input.age),
        sex: if input.sex == 1.0 { 10.0 } else { 5.0 },
        chest_pain: chest_pain_points(input.cp),
        blood_pressure: blood_pressure_points(input.trestbps),
        cholesterol: cholesterol_points(input.chol),
        fasting_blood_sugar: if input.fbs == 1.0 { 5.0 } else { 0.0 },
        resting_ecg: resting_ecg_points(input.restecg),
        max_heart_rate: max_heart_rate_points(input.thalach),
        exercise_angina: if input.exang == 1.0 { 10.0 } else { 0.0 },
        st_depression: st_depression_points(input.oldpeak),
        slope: slope_points(input.slope),
        vessels: input.ca * 3.0,
        thalassemia: thalassemia_points(input.thal),
    }
}

fn age_points(age: f64) -> f64 {
    if age < 40.0 {
        5.0
    } else if age < 50.0 {
        10.0
    } else if age < 60.0 {
        15.0
    } else if age < 70.0 {
        20.0
    } else {
        25.0
    }
}

fn chest_pain_points(cp: f64) -> f64 {
    if cp == 0.0 {
        20.0
    } else if cp == 1.0 {
        15.0
    } else if cp == 2.0 {
        10.0
    } else {
        5.0
    }
}

fn blood_pressure_points(trestbps: f64) -> f64 {
    if trestbps < 120.0 {
        3.0
    } else if trestbps < 140.0 {
        7.0
    } else if trestbps < 160.0 {
        12.0
    } else {
        15.0
    }
}

fn cholesterol_points(chol: f64) -> f64 {
    if chol < 200.0 {
        3.0
    } else if chol < 240.0 {
        8.0
    } else if chol < 280.0 {
        12.0
    } else {
        15.0
    }
}

fn resting_ecg_points(restecg: f64) -> f64 {
    if restecg == 1.0 {
        3.0
    } else if restecg == 2.0 {
        5.0
    } else {
        0.0
    }
}

// Lower max heart rate is riskier
fn max_heart_rate_points(thalach: f64) -> f64 {
    if thalach < 100.0 {
        10.0
    } else if thalach < 120.0 {
        7.0
    } else if thalach < 150.0 {
        4.0
    } else {
        2.0
    }
}

fn st_depression_points(oldpeak: f64) -> f64 {
    if oldpeak >= 3.0 {
        10.0
    } else if oldpeak >= 2.0 {
        7.0
    } else if oldpeak >= 1.0 {
        4.0
    } else {
        0.0
    }
}

fn slope_points(slope: f64) -> f64 {
    if slope == 0.0 {
        5.0
    } else if slope == 1.0 {
        3.0
    } else {
        1.0
    }
}

fn thalassemia_points(thal: f64) -> f64 {
    if thal == 3.0 {
        10.0
    } else if thal == 2.0 {
        7.0
    } else if thal == 1.0 {
        3.0
    } else {
        0.0
    }
}

/// Normalise a raw score into the clamped 5..=99 percentage.
pub fn probability_from_score(raw: f64) -> u8 {
    let pct = round_half_up(raw / MAX_SCORE * 100.0);
    pct.clamp(f64::from(MIN_PROBABILITY), f64::from(MAX_PROBABILITY)) as u8
}

/// Explanatory labels for the rules that fired, in fixed check order.
pub fn key_risk_factors(input: &RiskInput) -> Vec<&'static str> {
    let checks = [
        (input.age >= 55.0, "Age over 55"),
        (input.chol >= 240.0, "High Cholesterol"),
        (input.trestbps >= 140.0, "High Blood Pressure"),
        (input.exang == 1.0, "Exercise Induced Angina"),
        (input.cp == 0.0 || input.cp == 1.0, "Chest Pain"),
        (input.thalach < 120.0, "Low Max Heart Rate"),
        (input.ca >= 1.0, "Blocked Vessels"),
    ];

    let factors: Vec<&'static str> = checks
        .into_iter()
        .filter_map(|(fired, label)| fired.then_some(label))
        .collect();

    if factors.is_empty() {
        vec![NO_RISK_FACTORS]
    } else {
        factors
    }
}

pub fn sex_label(sex: f64) -> &'static str {
    if sex == 1.0 {
        "Male"
    } else {
        "Female"
    }
}

/// Chest pain label for a `cp` code; anything but 0..=3 is "Unknown".
pub fn chest_pain_label(cp: f64) -> &'static str {
    if cp.fract() != 0.0 || cp < 0.0 {
        return "Unknown";
    }
    CHEST_PAIN_TYPES
        .get(cp as usize)
        .copied()
        .unwrap_or("Unknown")
}

/// Round halves towards positive infinity.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}
