use std::fmt::Write;

use crate::assessment::Assessment;
use crate::batch::{BatchEntry, RiskSummary};
use crate::models::{Band, Guidance};

fn band_label(band: Band) -> &'static str {
    match band {
        Band::Low => "ok",
        Band::Medium => "watch",
        Band::High => "concern",
    }
}

fn write_items(output: &mut String, title: &str, items: &[Guidance]) {
    let _ = writeln!(output, "{title}:");
    for item in items {
        let _ = writeln!(output, "  - {}", item.text);
    }
}

/// Terminal summary of one assessment.
pub fn render_assessment(assessment: &Assessment, footer: Option<(&str, u64)>) -> String {
    let probabilities = &assessment.prediction.probabilities;
    let mut output = String::new();

    let _ = write!(
        output,
        "{} ({:.1}%",
        assessment.outcome.headline(),
        assessment.confidence * 100.0
    );
    if let Some(level) = &assessment.prediction.confidence_level {
        let _ = write!(output, ", {level} Confidence");
    }
    let _ = writeln!(output, ")");
    let _ = writeln!(output, "Risk level: {}", assessment.risk.label());
    let _ = writeln!(
        output,
        "Probabilities: graduate {:.1}% | enrolled {:.1}% | dropout {:.1}%",
        probabilities.graduate * 100.0,
        probabilities.enrolled * 100.0,
        probabilities.dropout * 100.0
    );
    if let Some(reliability) = &assessment.prediction.reliability {
        let _ = writeln!(output, "Reliability: {reliability}");
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "Key factors:");
    for factor in &assessment.key_factors {
        let _ = writeln!(
            output,
            "  - {} [{}] {:.0}/100: {}",
            factor.label, factor.badge, factor.score, factor.description
        );
    }

    let stats: Vec<String> = assessment
        .quick_stats
        .iter()
        .map(|stat| format!("{} {} ({})", stat.label, stat.display, band_label(stat.band)))
        .collect();
    let _ = writeln!(output, "Quick stats: {}", stats.join(" | "));
    let _ = writeln!(output);

    write_items(&mut output, "Recommendations", &assessment.recommendations);
    write_items(&mut output, "Action items", &assessment.action_items);
    let _ = writeln!(output);
    let _ = writeln!(output, "{}", assessment.fact);

    if let Some((quote, count)) = footer {
        let _ = writeln!(output, "\"{quote}\"");
        let _ = writeln!(output, "Predictions made: {count}");
    }

    output
}

pub fn render_batch(entries: &[BatchEntry], summaries: &[RiskSummary], limit: usize) -> String {
    let mut output = String::new();

    if entries.is_empty() {
        let _ = writeln!(output, "No students found in this batch.");
        return output;
    }

    let _ = writeln!(output, "Risk mix:");
    for summary in summaries {
        let _ = writeln!(
            output,
            "- {}: {} students (avg dropout {:.1}%)",
            summary.risk.label(),
            summary.count,
            summary.avg_dropout * 100.0
        );
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "Students by dropout probability:");
    for entry in entries.iter().take(limit) {
        let assessment = &entry.assessment;
        let _ = writeln!(
            output,
            "- {} ({} risk) dropout {:.1}%, grade {:.0}, approval {:.0}, financial {:.0}, engagement {:.0}",
            entry.name,
            assessment.risk.label(),
            assessment.prediction.probabilities.dropout * 100.0,
            assessment.metrics.grade_score,
            assessment.metrics.approval_score,
            assessment.metrics.financial_score,
            assessment.metrics.engagement_score
        );
        if let Some(first) = assessment.action_items.first() {
            let _ = writeln!(output, "    next step: {}", first.text);
        }
    }

    output
}
