//! Runs the scoring pipeline once per prediction and bundles everything the
//! renderers need.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::guidance::{self, RecommendationBranch};
use crate::metrics::{compute_metrics, key_factors};
use crate::models::{
    FormInput, Guidance, KeyFactor, Outcome, PredictorResult, QuickStat, RiskLevel,
    StudentAttributes, StudentMetrics,
};
use crate::risk::{classify_risk, primary_outcome, quick_stats};

#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub generated_at: DateTime<Utc>,
    pub input: FormInput,
    pub attributes: StudentAttributes,
    pub prediction: PredictorResult,
    pub outcome: Outcome,
    pub confidence: f64,
    pub risk: RiskLevel,
    pub metrics: StudentMetrics,
    pub branch: RecommendationBranch,
    pub recommendations: Vec<Guidance>,
    pub action_items: Vec<Guidance>,
    pub key_factors: Vec<KeyFactor>,
    pub quick_stats: Vec<QuickStat>,
    pub fact: &'static str,
}

pub fn assess(input: FormInput, prediction: PredictorResult) -> Assessment {
    assess_at(input, prediction, Utc::now())
}

pub fn assess_at(
    input: FormInput,
    prediction: PredictorResult,
    generated_at: DateTime<Utc>,
) -> Assessment {
    let attributes = StudentAttributes::from_form(&input);
    let probabilities = prediction.probabilities;

    let metrics = compute_metrics(&attributes);
    let risk = classify_risk(&probabilities);
    let branch = RecommendationBranch::select(risk, &probabilities);
    let recommendations = guidance::recommend(risk, &probabilities);
    let action_items = guidance::action_items(&attributes, &probabilities);
    let (outcome, confidence) = primary_outcome(&probabilities);

    Assessment {
        generated_at,
        key_factors: key_factors(&metrics),
        quick_stats: quick_stats(&attributes),
        fact: guidance::did_you_know(&input),
        input,
        attributes,
        prediction,
        outcome,
        confidence,
        risk,
        metrics,
        branch,
        recommendations,
        action_items,
    }
}
