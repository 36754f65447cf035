use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use tracing::{info, warn};

use crate::assessment::{assess, Assessment};
use crate::models::{FormInput, OutcomeProbabilities, PredictorResult, RiskLevel};

const NAME_COLUMN: &str = "name";
const PROBABILITY_COLUMNS: [&str; 3] = ["dropout", "enrolled", "graduate"];

#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub name: String,
    pub assessment: Assessment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskSummary {
    pub risk: RiskLevel,
    pub count: usize,
    pub avg_dropout: f64,
}

pub fn load_csv(csv_path: &Path) -> anyhow::Result<Vec<BatchEntry>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let entries = read_entries(file)?;
    info!(rows = entries.len(), path = %csv_path.display(), "batch loaded");
    Ok(entries)
}

/// Assesses every row and ranks the result by dropout probability, highest first.
pub fn read_entries<R: Read>(source: R) -> anyhow::Result<Vec<BatchEntry>> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = reader.headers()?.clone();

    for column in PROBABILITY_COLUMNS {
        if !headers.iter().any(|header| header.trim() == column) {
            bail!("batch CSV is missing the `{column}` column");
        }
    }

    let mut entries = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("malformed CSV row {}", index + 1))?;
        let cell = |column: &str| {
            headers
                .iter()
                .position(|header| header.trim() == column)
                .and_then(|position| record.get(position))
                .map(str::trim)
                .unwrap_or("")
        };

        if PROBABILITY_COLUMNS.iter().all(|column| cell(column).is_empty()) {
            warn!(row = index + 1, "skipping row without probabilities");
            continue;
        }

        let row = FormInput::from_pairs(headers.iter().zip(record.iter()));
        let probabilities = OutcomeProbabilities::new(
            row.get("dropout"),
            row.get("enrolled"),
            row.get("graduate"),
        );
        let input = FormInput::from_pairs(
            headers
                .iter()
                .zip(record.iter())
                .filter(|(header, _)| {
                    let header = header.trim();
                    header != NAME_COLUMN && !PROBABILITY_COLUMNS.contains(&header)
                }),
        );

        let name = match cell(NAME_COLUMN) {
            "" => format!("row {}", index + 1),
            name => name.to_string(),
        };

        entries.push(BatchEntry {
            name,
            assessment: assess(input, PredictorResult::from_probabilities(probabilities)),
        });
    }

    entries.sort_by(|a, b| {
        b.assessment
            .prediction
            .probabilities
            .dropout
            .partial_cmp(&a.assessment.prediction.probabilities.dropout)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(entries)
}

pub fn summarize_by_risk(entries: &[BatchEntry]) -> Vec<RiskSummary> {
    [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low]
        .into_iter()
        .filter_map(|risk| {
            let dropouts: Vec<f64> = entries
                .iter()
                .filter(|entry| entry.assessment.risk == risk)
                .map(|entry| entry.assessment.prediction.probabilities.dropout)
                .collect();
            if dropouts.is_empty() {
                return None;
            }
            Some(RiskSummary {
                risk,
                count: dropouts.len(),
                avg_dropout: dropouts.iter().sum::<f64>() / dropouts.len() as f64,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
name,attendance_percentage,study_hours_per_week,curricular_units_1st_sem_(grade),dropout,enrolled,graduate
Avery Lee,95,12,16,0.1,0.2,0.7
Jules Moreno,50,3,9,0.65,0.2,0.15
Kiara Patel,80,8,12,0.3,0.4,0.3
,70,10,8,0.25,0.25,0.5
Missing Probs,90,10,8,,,
";

    #[test]
    fn rows_are_ranked_by_dropout() {
        let entries = read_entries(SAMPLE.as_bytes()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Jules Moreno", "Kiara Patel", "row 4", "Avery Lee"]);
        assert_eq!(entries[0].assessment.risk, RiskLevel::High);
        assert_eq!(entries[3].assessment.risk, RiskLevel::Low);
    }

    #[test]
    fn probability_columns_do_not_leak_into_attributes() {
        let entries = read_entries(SAMPLE.as_bytes()).unwrap();
        let avery = entries.iter().find(|e| e.name == "Avery Lee").unwrap();
        let keys: Vec<&str> = avery.assessment.input.iter().map(|(key, _)| key).collect();
        assert!(!keys.contains(&"dropout"));
        assert!(!keys.contains(&"name"));
        assert_eq!(keys.len(), 3);
        assert_eq!(avery.assessment.attributes.attendance_percentage, 95.0);
        assert!((avery.assessment.metrics.avg_grade - 8.0).abs() < 1e-9);
    }

    #[test]
    fn summary_counts_each_risk_level() {
        let entries = read_entries(SAMPLE.as_bytes()).unwrap();
        let summary = summarize_by_risk(&entries);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].risk, RiskLevel::High);
        assert_eq!(summary[0].count, 1);
        assert_eq!(summary[1].risk, RiskLevel::Medium);
        assert_eq!(summary[1].count, 2);
        assert!((summary[1].avg_dropout - 0.275).abs() < 1e-9);
        assert_eq!(summary[2].count, 1);
    }

    #[test]
    fn infinite_probabilities_read_as_zero() {
        let csv = "name,dropout,enrolled,graduate\nA,inf,0.2,0.7\n";
        let entries = read_entries(csv.as_bytes()).unwrap();
        assert_eq!(entries[0].assessment.risk, RiskLevel::Low);

        let summary = summarize_by_risk(&entries);
        assert_eq!(summary[0].avg_dropout, 0.0);
    }

    #[test]
    fn missing_probability_column_is_rejected() {
        let csv = "name,dropout,graduate\nAvery,0.1,0.9\n";
        let err = read_entries(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("enrolled"));
    }
}
