use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::assessment::Assessment;

/// The only state written to disk: how many predictions have been made.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterState {
    pub prediction_count: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Per-invocation context owned by the CLI and passed to the renderers.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    state_path: PathBuf,
    counter: CounterState,
    latest: Option<Assessment>,
}

impl Session {
    pub fn open(state_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let state_path = state_path.into();
        let counter = load_counter(&state_path)?;
        let id = Uuid::new_v4();
        debug!(session = %id, count = counter.prediction_count, "session opened");

        Ok(Self {
            id,
            state_path,
            counter,
            latest: None,
        })
    }

    pub fn prediction_count(&self) -> u64 {
        self.counter.prediction_count
    }

    pub fn latest(&self) -> Option<&Assessment> {
        self.latest.as_ref()
    }

    /// Stores a successful prediction and bumps the persisted counter.
    /// Returns the new count.
    pub fn record(&mut self, assessment: &Assessment) -> anyhow::Result<u64> {
        self.counter.prediction_count += 1;
        self.counter.updated_at = Some(Utc::now());
        save_counter(&self.state_path, &self.counter)?;
        info!(
            session = %self.id,
            count = self.counter.prediction_count,
            "prediction recorded"
        );

        self.latest = Some(assessment.clone());
        Ok(self.counter.prediction_count)
    }

    pub fn reset(&mut self) -> anyhow::Result<()> {
        self.counter = CounterState {
            prediction_count: 0,
            updated_at: Some(Utc::now()),
        };
        self.latest = None;
        save_counter(&self.state_path, &self.counter)
    }
}

fn load_counter(path: &Path) -> anyhow::Result<CounterState> {
    if !path.exists() {
        return Ok(CounterState::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("state file {} is not valid JSON", path.display()))
}

fn save_counter(path: &Path, counter: &CounterState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create state directory {}", parent.display()))?;
    }

    let raw = serde_json::to_string_pretty(counter)?;
    std::fs::write(path, raw)
        .with_context(|| format!("failed to write state file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::assess;
    use crate::models::{FormInput, OutcomeProbabilities, PredictorResult};

    fn sample_assessment() -> Assessment {
        let prediction =
            PredictorResult::from_probabilities(OutcomeProbabilities::new(0.3, 0.3, 0.4));
        assess(FormInput::default(), prediction)
    }

    #[test]
    fn missing_state_file_starts_at_zero() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::open(dir.path().join("state.json")).unwrap();
        assert_eq!(session.prediction_count(), 0);
        assert!(session.latest().is_none());
    }

    #[test]
    fn counter_survives_between_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut first = Session::open(&path).unwrap();
        let assessment = sample_assessment();
        assert_eq!(first.record(&assessment).unwrap(), 1);
        assert_eq!(first.record(&assessment).unwrap(), 2);
        assert_eq!(first.prediction_count(), 2);
        assert!(first.latest().is_some());

        let second = Session::open(&path).unwrap();
        assert_eq!(second.prediction_count(), 2);
        assert!(second.latest().is_none());
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn reset_clears_the_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut session = Session::open(&path).unwrap();
        session.record(&sample_assessment()).unwrap();
        session.reset().unwrap();

        assert_eq!(Session::open(&path).unwrap().prediction_count(), 0);
    }

    #[test]
    fn corrupt_state_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Session::open(&path).is_err());
    }
}
