use serde_json::{Map, Value};

use crate::metrics::clamp;
use crate::models::{fields, FormInput};

pub const PREDICTOR_GRADE_MAX: f64 = 20.0;

/// Doubles a form grade for the predictor and bounds it to `[0, 20]`.
/// Grades already above 10 are doubled too and land on the cap.
pub fn predictor_grade(raw: f64) -> f64 {
    clamp(raw * 2.0, 0.0, PREDICTOR_GRADE_MAX)
}

/// Request body for `/predict`. Every form field is forwarded; only grades
/// are rescaled.
pub fn build_payload(input: &FormInput) -> Map<String, Value> {
    input
        .iter()
        .map(|(key, value)| {
            let value = if fields::GRADES.contains(&key) {
                predictor_grade(value)
            } else {
                value
            };
            (key.to_string(), Value::from(value))
        })
        .collect()
}
