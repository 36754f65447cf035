use std::collections::BTreeMap;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field names shared with the predictor service.
pub mod fields {
    pub const GRADE_1ST: &str = "curricular_units_1st_sem_(grade)";
    pub const GRADE_2ND: &str = "curricular_units_2nd_sem_(grade)";
    pub const ENROLLED_1ST: &str = "curricular_units_1st_sem_(enrolled)";
    pub const ENROLLED_2ND: &str = "curricular_units_2nd_sem_(enrolled)";
    pub const APPROVED_1ST: &str = "curricular_units_1st_sem_(approved)";
    pub const APPROVED_2ND: &str = "curricular_units_2nd_sem_(approved)";
    pub const ATTENDANCE: &str = "attendance_percentage";
    pub const STUDY_HOURS: &str = "study_hours_per_week";
    pub const PREVIOUS_FAILURES: &str = "previous_failures";
    pub const TUITION_UP_TO_DATE: &str = "tuition_fees_up_to_date";
    pub const SCHOLARSHIP_HOLDER: &str = "scholarship_holder";
    pub const DEBTOR: &str = "debtor";
    pub const AGE_AT_ENROLLMENT: &str = "age_at_enrollment";

    pub const GRADES: [&str; 2] = [GRADE_1ST, GRADE_2ND];
    pub const HOBBIES: [&str; 6] = [
        "hobbies_sports",
        "hobbies_arts",
        "hobbies_reading",
        "hobbies_social",
        "hobbies_gaming",
        "hobbies_volunteering",
    ];
}

pub const MAX_HOBBY_RATING: f64 = 5.0;

/// Raw form fields after numeric coercion. Anything that does not read as a
/// number is stored as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormInput {
    values: BTreeMap<String, f64>,
}

impl FormInput {
    pub fn from_json(value: &Value) -> anyhow::Result<Self> {
        let Value::Object(map) = value else {
            bail!("student input must be a JSON object of field names to values");
        };

        let values = map
            .iter()
            .map(|(key, value)| (key.clone(), coerce_value(value)))
            .collect();

        Ok(Self { values })
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let values = pairs
            .into_iter()
            .map(|(key, raw)| (key.trim().to_string(), coerce_str(raw)))
            .collect();

        Self { values }
    }

    pub fn get(&self, key: &str) -> f64 {
        self.values.get(key).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(key, value)| (key.as_str(), *value))
    }
}

fn coerce_value(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().map(sanitize).unwrap_or(0.0),
        Value::String(raw) => coerce_str(raw),
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

fn coerce_str(raw: &str) -> f64 {
    raw.trim().parse::<f64>().map(sanitize).unwrap_or(0.0)
}

fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentAttributes {
    pub grade_1st: f64,
    pub grade_2nd: f64,
    pub enrolled_1st: f64,
    pub enrolled_2nd: f64,
    pub approved_1st: f64,
    pub approved_2nd: f64,
    pub attendance_percentage: f64,
    pub study_hours_per_week: f64,
    pub previous_failures: f64,
    pub tuition_up_to_date: bool,
    pub scholarship_holder: bool,
    pub debtor: bool,
    pub hobbies: [f64; 6],
    pub age_at_enrollment: Option<f64>,
}

impl StudentAttributes {
    pub fn from_form(input: &FormInput) -> Self {
        let flag = |key: &str| input.get(key) == 1.0;
        let hobbies = fields::HOBBIES.map(|key| input.get(key).clamp(0.0, MAX_HOBBY_RATING));
        let age = input.get(fields::AGE_AT_ENROLLMENT);

        Self {
            grade_1st: input.get(fields::GRADE_1ST),
            grade_2nd: input.get(fields::GRADE_2ND),
            enrolled_1st: input.get(fields::ENROLLED_1ST),
            enrolled_2nd: input.get(fields::ENROLLED_2ND),
            approved_1st: input.get(fields::APPROVED_1ST),
            approved_2nd: input.get(fields::APPROVED_2ND),
            attendance_percentage: input.get(fields::ATTENDANCE),
            study_hours_per_week: input.get(fields::STUDY_HOURS),
            previous_failures: input.get(fields::PREVIOUS_FAILURES),
            tuition_up_to_date: flag(fields::TUITION_UP_TO_DATE),
            scholarship_holder: flag(fields::SCHOLARSHIP_HOLDER),
            debtor: flag(fields::DEBTOR),
            hobbies,
            age_at_enrollment: (age > 0.0).then_some(age),
        }
    }

    pub fn semester_grades(&self) -> [f64; 2] {
        [self.grade_1st, self.grade_2nd]
    }
}

impl Default for StudentAttributes {
    fn default() -> Self {
        Self::from_form(&FormInput::default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub dropout: f64,
    pub enrolled: f64,
    pub graduate: f64,
}

impl OutcomeProbabilities {
    pub fn new(dropout: f64, enrolled: f64, graduate: f64) -> Self {
        Self {
            dropout: finite_or_zero(dropout),
            enrolled: finite_or_zero(enrolled),
            graduate: finite_or_zero(graduate),
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentMetrics {
    pub avg_grade: f64,
    pub grade_score: f64,
    pub total_enrolled: f64,
    pub total_approved: f64,
    pub approval_rate: f64,
    pub approval_score: f64,
    pub tuition_up_to_date: bool,
    pub has_scholarship: bool,
    pub is_debtor: bool,
    pub financial_score: f64,
    pub engagement_average: f64,
    pub engagement_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            RiskLevel::Low => "check_circle",
            RiskLevel::Medium => "warning",
            RiskLevel::High => "error",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            RiskLevel::Low => "risk-low",
            RiskLevel::Medium => "risk-medium",
            RiskLevel::High => "risk-high",
        }
    }
}

/// One recommendation or action item as rendered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Guidance {
    pub icon: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Graduate,
    Enrolled,
    Dropout,
}

impl Outcome {
    pub fn headline(&self) -> &'static str {
        match self {
            Outcome::Graduate => "Likely to Graduate",
            Outcome::Enrolled => "Currently Enrolled",
            Outcome::Dropout => "At Risk of Dropout",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Outcome::Graduate => "school",
            Outcome::Enrolled => "person",
            Outcome::Dropout => "warning",
        }
    }
}

/// Probabilities plus whatever descriptive fields the predictor returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PredictorResult {
    pub probabilities: OutcomeProbabilities,
    pub predicted_status: Option<String>,
    pub confidence: Option<String>,
    pub confidence_level: Option<String>,
    pub reliability: Option<String>,
    pub model_version: Option<String>,
}

impl PredictorResult {
    pub fn from_probabilities(probabilities: OutcomeProbabilities) -> Self {
        Self {
            probabilities,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Band {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickStat {
    pub label: &'static str,
    pub display: String,
    pub band: Band,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyFactor {
    pub label: &'static str,
    pub icon: &'static str,
    pub score: f64,
    pub badge: String,
    pub description: String,
}
