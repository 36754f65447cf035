use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{OutcomeProbabilities, PredictorResult};

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("request to predictor failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("prediction failed with status: {0}")]
    Status(StatusCode),

    #[error("server error ({kind}): {message}")]
    Server { message: String, kind: String },

    #[error("invalid response format from server: {0}")]
    Format(String),
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    error: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    model_version: Option<String>,
    #[serde(rename = "predictions by model", default)]
    predictions: Vec<ModelPrediction>,
}

#[derive(Debug, Deserialize)]
struct ModelPrediction {
    predicted_status: Option<String>,
    confidence: Option<String>,
    confidence_level: Option<String>,
    reliability: Option<String>,
    probabilities: ClassProbabilities,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ClassProbabilities {
    #[serde(default)]
    dropout: f64,
    #[serde(default)]
    enrolled: f64,
    #[serde(default)]
    graduate: f64,
}

/// Reads the first prediction out of a `/predict` response body.
pub fn parse_response(body: Value) -> Result<PredictorResult, PredictorError> {
    let response: PredictResponse =
        serde_json::from_value(body).map_err(|err| PredictorError::Format(err.to_string()))?;

    if let Some(message) = response.error {
        return Err(PredictorError::Server {
            message,
            kind: response.kind.unwrap_or_else(|| "Error".to_string()),
        });
    }

    let prediction = response
        .predictions
        .into_iter()
        .next()
        .ok_or_else(|| PredictorError::Format("no predictions returned".to_string()))?;
    let probs = prediction.probabilities;

    Ok(PredictorResult {
        probabilities: OutcomeProbabilities::new(probs.dropout, probs.enrolled, probs.graduate),
        predicted_status: prediction.predicted_status,
        confidence: prediction.confidence,
        confidence_level: prediction.confidence_level,
        reliability: prediction.reliability,
        model_version: response.model_version,
    })
}

pub struct PredictorClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PredictorClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PredictorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: predict_endpoint(base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn predict(&self, payload: &Map<String, Value>) -> Result<PredictorResult, PredictorError> {
        info!(endpoint = %self.endpoint, fields = payload.len(), "sending prediction request");

        let response = self.client.post(&self.endpoint).json(payload).send().await?;
        let status = response.status();
        debug!(%status, "predictor responded");

        let body: Option<Value> = response.json().await.ok();
        interpret(status, body)
    }
}

/// Decides the outcome of a `/predict` call from its status and JSON body.
/// An `error` field wins over the status code.
fn interpret(status: StatusCode, body: Option<Value>) -> Result<PredictorResult, PredictorError> {
    match body {
        Some(body) if body.get("error").is_some() => parse_response(body),
        _ if !status.is_success() => Err(PredictorError::Status(status)),
        Some(body) => parse_response(body),
        None => Err(PredictorError::Format("response body is not JSON".to_string())),
    }
}

fn predict_endpoint(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/predict") {
        base.to_string()
    } else {
        format!("{base}/predict")
    }
}
