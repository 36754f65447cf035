use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;

pub const DEFAULT_PREDICTOR_URL: &str = "http://localhost:9696";
pub const DEFAULT_STATE_PATH: &str = ".student-shield/state.json";

/// Settings shared by every command. Each flag falls back to its environment
/// variable, which may come from a `.env` file.
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Base URL of the prediction service
    #[arg(long, global = true, env = "PREDICTOR_URL", default_value = DEFAULT_PREDICTOR_URL)]
    pub predictor_url: String,

    /// Seconds to wait for the prediction service
    #[arg(long, global = true, env = "PREDICTOR_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// File holding the prediction counter
    #[arg(long, global = true, env = "STUDENT_SHIELD_STATE", default_value = DEFAULT_STATE_PATH)]
    pub state_path: PathBuf,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

pub const DOTENV_FILE: &str = ".env";

/// Loads environment variables from `path` if it exists. A missing file is
/// not an error. Runs before logging is set up, so failures are returned for
/// the caller to log.
pub fn load_env_file(path: &Path) -> Result<(), dotenvy::Error> {
    match dotenvy::from_path(path) {
        Err(err) if err.not_found() => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        settings: Settings,
    }

    #[test]
    fn flags_override_defaults() {
        let harness = Harness::parse_from([
            "student-shield",
            "--predictor-url",
            "http://predictor.internal:8080",
            "--timeout-secs",
            "0",
            "--state-path",
            "/tmp/state.json",
        ]);
        assert_eq!(harness.settings.predictor_url, "http://predictor.internal:8080");
        assert_eq!(harness.settings.timeout(), Duration::from_secs(1));
        assert_eq!(harness.settings.state_path, PathBuf::from("/tmp/state.json"));
        assert_eq!(harness.settings.log_level, "info");
    }

    #[test]
    fn missing_env_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_file(&dir.path().join(".env")).is_ok());
    }

    #[test]
    fn unreadable_env_file_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_env_file(dir.path()).unwrap_err();
        assert!(!err.not_found());
    }
}
