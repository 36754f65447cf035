use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod assessment;
mod batch;
mod config;
mod guidance;
mod metrics;
mod models;
mod payload;
mod predictor;
mod render;
mod report;
mod risk;
mod session;

use crate::assessment::{assess, Assessment};
use crate::config::Settings;
use crate::models::{FormInput, OutcomeProbabilities, PredictorResult};
use crate::predictor::PredictorClient;
use crate::report::ReportFormat;
use crate::session::Session;

#[derive(Parser)]
#[command(name = "student-shield")]
#[command(about = "Student outcome insights from graduate/enrolled/dropout predictions", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ProbabilityArgs {
    /// Probability of dropping out (0-1)
    #[arg(long)]
    dropout: f64,
    /// Probability of staying enrolled (0-1)
    #[arg(long)]
    enrolled: f64,
    /// Probability of graduating (0-1)
    #[arg(long)]
    graduate: f64,
}

impl ProbabilityArgs {
    fn to_prediction(&self) -> PredictorResult {
        PredictorResult::from_probabilities(OutcomeProbabilities::new(
            self.dropout,
            self.enrolled,
            self.graduate,
        ))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score a student against probabilities you already have
    Assess {
        /// JSON object of form fields, or `-` for stdin
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        probabilities: ProbabilityArgs,
        /// Print the full assessment as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask the prediction service about a student and score the result
    Predict {
        /// JSON object of form fields, or `-` for stdin
        #[arg(long)]
        input: PathBuf,
        /// Also write a report to this file
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Html)]
        format: ReportFormat,
        /// Print the full assessment as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the request body that would be sent to the prediction service
    Payload {
        #[arg(long)]
        input: PathBuf,
    },
    /// Score every student in a CSV file
    Batch {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Write a printable report
    Report {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        probabilities: ProbabilityArgs,
        #[arg(long, default_value = "report.html")]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = ReportFormat::Html)]
        format: ReportFormat,
    },
    /// Show how many predictions have been made
    Count,
    /// Set the prediction counter back to zero
    ResetCount,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &Path) -> anyhow::Result<FormInput> {
    let raw = if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read student input from stdin")?;
        raw
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read student input {}", path.display()))?
    };

    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    FormInput::from_json(&value)
}

fn write_report(path: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write report {}", path.display()))
}

/// The state file is opened before the request goes out, so a prediction is
/// only made when it can be counted.
async fn predict_and_record(
    settings: &Settings,
    input: FormInput,
) -> anyhow::Result<(Session, Assessment, u64)> {
    let mut session = Session::open(&settings.state_path)?;
    let payload = payload::build_payload(&input);
    let client = PredictorClient::new(&settings.predictor_url, settings.timeout())?;
    let prediction = client
        .predict(&payload)
        .await
        .with_context(|| format!("error making prediction via {}", client.endpoint()))?;

    let assessment = assess(input, prediction);
    let count = session.record(&assessment)?;
    Ok((session, assessment, count))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = config::load_env_file(Path::new(config::DOTENV_FILE));
    let cli = Cli::parse();
    init_tracing(&cli.settings.log_level);
    if let Err(err) = dotenv {
        warn!(%err, "ignoring unreadable .env file");
    }
    let settings = cli.settings;

    match cli.command {
        Commands::Assess {
            input,
            probabilities,
            json,
        } => {
            let assessment = assess(read_input(&input)?, probabilities.to_prediction());
            if json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                print!("{}", render::render_assessment(&assessment, None));
            }
        }
        Commands::Predict {
            input,
            report,
            format,
            json,
        } => {
            let (session, assessment, count) =
                predict_and_record(&settings, read_input(&input)?).await?;

            if let (Some(path), Some(latest)) = (report, session.latest()) {
                write_report(&path, &report::build_report(latest, format))?;
                info!(path = %path.display(), "report written");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                let quote = guidance::motivation(count);
                print!(
                    "{}",
                    render::render_assessment(&assessment, Some((quote, count)))
                );
            }
        }
        Commands::Payload { input } => {
            let payload = payload::build_payload(&read_input(&input)?);
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Commands::Batch { csv, limit } => {
            let entries = batch::load_csv(&csv)?;
            let summaries = batch::summarize_by_risk(&entries);
            print!("{}", render::render_batch(&entries, &summaries, limit));
        }
        Commands::Report {
            input,
            probabilities,
            out,
            format,
        } => {
            let assessment = assess(read_input(&input)?, probabilities.to_prediction());
            write_report(&out, &report::build_report(&assessment, format))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Count => {
            let session = Session::open(&settings.state_path)?;
            println!("Predictions made: {}", session.prediction_count());
        }
        Commands::ResetCount => {
            let mut session = Session::open(&settings.state_path)?;
            session.reset()?;
            println!("Prediction counter reset.");
        }
    }

    Ok(())
}
