use serde_json::Value;

use crate::error::ScoreError;
use crate::models::RiskInput;

/// Request field names in [`RiskInput`] declaration order.
pub const FIELDS: [&str; 13] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

impl RiskInput {
    /// Build an input from a decoded request body.
    ///
    /// Every field must be present (all absent fields are reported
    /// together) and be either a JSON number or a string
    /// holding a finite number (form fields often arrive as strings).
    /// Anything else is rejected before it can reach the scorer.
    pub fn from_json(body: &Value) -> Result<Self, ScoreError> {
        let object = body
            .as_object()
            .ok_or_else(|| ScoreError::invalid("body", "must be a JSON object"))?;

        let missing: Vec<&str> = FIELDS
            .into_iter()
            .filter(|name| matches!(object.get(*name), None | Some(Value::Null)))
            .collect();
        match missing.as_slice() {
            [] => {}
            [name] => return Err(ScoreError::invalid(name, "is required")),
            names => return Err(ScoreError::invalid(&names.join(", "), "are required")),
        }

        let mut values = [0.0; FIELDS.len()];
        for (slot, name) in values.iter_mut().zip(FIELDS) {
            *slot = coerce_number(name, object.get(name).unwrap_or(&Value::Null))?;
        }
        let [age, sex, cp, trestbps, chol, fbs, restecg, thalach, exang, oldpeak, slope, ca, thal] =
            values;

        Ok(RiskInput {
            age,
            sex,
            cp,
            trestbps,
            chol,
            fbs,
            restecg,
            thalach,
            exang,
            oldpeak,
            slope,
            ca,
            thal,
        })
    }
}

fn coerce_number(name: &str, value: &Value) -> Result<f64, ScoreError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ScoreError::invalid(name, "must be a number")),
    }
}
