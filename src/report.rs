use std::fmt::Write;

use clap::ValueEnum;

use crate::assessment::Assessment;
use crate::models::{fields, FormInput, Guidance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Markdown,
    Html,
}

pub fn build_report(assessment: &Assessment, format: ReportFormat) -> String {
    match format {
        ReportFormat::Markdown => build_markdown(assessment),
        ReportFormat::Html => build_html(assessment),
    }
}

fn percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

fn timestamp(assessment: &Assessment) -> String {
    assessment
        .generated_at
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

/// Rows of the "Key Student Information" table.
fn student_information(input: &FormInput) -> Vec<(&'static str, String)> {
    let or_na = |key: &str| {
        let value = input.get(key);
        if value != 0.0 {
            value.to_string()
        } else {
            "N/A".to_string()
        }
    };
    let units = |enrolled: &str, approved: &str| {
        format!("{} / {}", input.get(enrolled), input.get(approved))
    };

    vec![
        (
            "Age at Enrollment",
            format!("{} years", or_na(fields::AGE_AT_ENROLLMENT)),
        ),
        (
            "Previous Failures",
            input.get(fields::PREVIOUS_FAILURES).to_string(),
        ),
        (
            "1st Semester - Enrolled/Approved",
            units(fields::ENROLLED_1ST, fields::APPROVED_1ST),
        ),
        ("1st Semester - Average Grade", or_na(fields::GRADE_1ST)),
        (
            "2nd Semester - Enrolled/Approved",
            units(fields::ENROLLED_2ND, fields::APPROVED_2ND),
        ),
        ("2nd Semester - Average Grade", or_na(fields::GRADE_2ND)),
        (
            "Tuition Fees Status",
            if input.get(fields::TUITION_UP_TO_DATE) == 1.0 {
                "Up to Date".to_string()
            } else {
                "Not Current".to_string()
            },
        ),
        (
            "Scholarship Holder",
            if input.get(fields::SCHOLARSHIP_HOLDER) == 1.0 {
                "Yes".to_string()
            } else {
                "No".to_string()
            },
        ),
    ]
}

fn metric_cards(assessment: &Assessment) -> [(&'static str, String); 5] {
    let metrics = &assessment.metrics;
    [
        ("Academic Performance", format!("{:.0}/100", metrics.grade_score)),
        ("Units Approved", format!("{:.0}/100", metrics.approval_score)),
        ("Financial Stability", format!("{:.0}/100", metrics.financial_score)),
        ("Student Engagement", format!("{:.0}/100", metrics.engagement_score)),
        (
            "Graduate Probability",
            percent(assessment.prediction.probabilities.graduate),
        ),
    ]
}

pub fn build_markdown(assessment: &Assessment) -> String {
    let probabilities = &assessment.prediction.probabilities;
    let mut output = String::new();

    let _ = writeln!(output, "# Student Success Prediction Report");
    let _ = writeln!(output, "Generated {}", timestamp(assessment));
    if let Some(version) = &assessment.prediction.model_version {
        let _ = writeln!(output, "Model: {version}");
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Primary Prediction");
    let _ = writeln!(output, "- Status: {}", assessment.outcome.headline());
    let _ = write!(output, "- Confidence: {}", percent(assessment.confidence));
    if let Some(level) = &assessment.prediction.confidence_level {
        let _ = write!(output, " ({level} Confidence)");
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "- Risk Level: {}", assessment.risk.label());
    let _ = writeln!(output);

    let _ = writeln!(output, "## Probability Distribution");
    let _ = writeln!(output, "| Outcome | Probability |");
    let _ = writeln!(output, "| --- | --- |");
    let _ = writeln!(output, "| Graduate | {} |", percent(probabilities.graduate));
    let _ = writeln!(
        output,
        "| Enrolled (Continuing) | {} |",
        percent(probabilities.enrolled)
    );
    let _ = writeln!(output, "| Dropout | {} |", percent(probabilities.dropout));
    let _ = writeln!(output);

    let _ = writeln!(output, "## Student Metrics");
    for (label, value) in metric_cards(assessment) {
        let _ = writeln!(output, "- {label}: {value}");
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Key Factors");
    for factor in &assessment.key_factors {
        let _ = writeln!(
            output,
            "- {} [{}]: {}",
            factor.label, factor.badge, factor.description
        );
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Key Student Information");
    for (label, value) in student_information(&assessment.input) {
        let _ = writeln!(output, "- {label}: {value}");
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Recommendations for Teachers");
    write_guidance_markdown(&mut output, &assessment.recommendations);
    let _ = writeln!(output);

    let _ = writeln!(output, "## Action Items");
    write_guidance_markdown(&mut output, &assessment.action_items);

    output
}

fn write_guidance_markdown(output: &mut String, items: &[Guidance]) {
    if items.is_empty() {
        let _ = writeln!(output, "No specific recommendations available at this time.");
        return;
    }
    for item in items {
        let _ = writeln!(output, "- {}", item.text);
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const REPORT_CSS: &str = r#"
        @media print { body { margin: 0; } .no-print { display: none; } }
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; max-width: 210mm; margin: 0 auto; padding: 20mm; background: white; color: #333; }
        .header { text-align: center; border-bottom: 3px solid #667eea; padding-bottom: 20px; margin-bottom: 30px; }
        .header h1 { color: #667eea; margin: 0 0 10px 0; font-size: 28px; }
        .header .subtitle { color: #666; font-size: 14px; }
        .section { margin: 25px 0; page-break-inside: avoid; }
        .section-title { background: #667eea; color: white; padding: 10px 15px; font-size: 16px; font-weight: bold; margin-bottom: 15px; border-radius: 5px; }
        .prediction-box { background: #f0f2f5; border-left: 5px solid #667eea; padding: 20px; margin: 15px 0; border-radius: 5px; }
        .prediction-box .main-result { font-size: 32px; font-weight: bold; color: #667eea; margin: 10px 0; }
        .prediction-box .confidence { font-size: 18px; color: #666; }
        .prob-table { width: 100%; border-collapse: collapse; margin: 15px 0; }
        .prob-table th { background: #667eea; color: white; padding: 12px; text-align: left; font-weight: 600; }
        .prob-table td { padding: 10px 12px; border-bottom: 1px solid #ddd; }
        .prob-table tr:nth-child(even) { background: #f9f9f9; }
        .risk-badge { display: inline-block; padding: 5px 15px; border-radius: 20px; font-weight: bold; font-size: 14px; }
        .risk-low { background: #d1fae5; color: #065f46; }
        .risk-medium { background: #fef3c7; color: #92400e; }
        .risk-high { background: #fee2e2; color: #991b1b; }
        .metrics-grid { display: grid; grid-template-columns: repeat(2, 1fr); gap: 15px; margin: 15px 0; }
        .metric-card { background: #f9fafb; padding: 15px; border-radius: 8px; border: 1px solid #e5e7eb; }
        .metric-card .label { font-size: 12px; color: #666; text-transform: uppercase; margin-bottom: 5px; }
        .metric-card .value { font-size: 20px; font-weight: bold; color: #667eea; }
        .recommendations { background: #fffbeb; border-left: 4px solid #f59e0b; padding: 15px; margin: 15px 0; border-radius: 5px; }
        .recommendations li { margin: 8px 0; line-height: 1.6; }
        .footer { margin-top: 40px; padding-top: 20px; border-top: 2px solid #e5e7eb; text-align: center; color: #666; font-size: 12px; }
        .print-btn { background: #667eea; color: white; border: none; padding: 12px 30px; font-size: 16px; border-radius: 5px; cursor: pointer; margin: 20px auto; display: block; }
"#;

/// Self-contained printable page.
pub fn build_html(assessment: &Assessment) -> String {
    let probabilities = &assessment.prediction.probabilities;
    let generated = html_escape(&timestamp(assessment));
    let confidence_level = assessment
        .prediction
        .confidence_level
        .as_deref()
        .map(|level| format!(" ({} Confidence)", html_escape(level)))
        .unwrap_or_default();

    let mut output = String::new();
    let _ = writeln!(output, "<!DOCTYPE html>");
    let _ = writeln!(output, "<html>");
    let _ = writeln!(output, "<head>");
    let _ = writeln!(output, "    <meta charset=\"utf-8\">");
    let _ = writeln!(output, "    <title>Student Success Prediction Report</title>");
    let _ = writeln!(output, "    <style>{REPORT_CSS}    </style>");
    let _ = writeln!(output, "</head>");
    let _ = writeln!(output, "<body>");

    let _ = writeln!(output, "<div class=\"header\">");
    let _ = writeln!(output, "    <h1>Student Success Prediction Report</h1>");
    let _ = writeln!(
        output,
        "    <div class=\"subtitle\">Academic Success Analysis</div>"
    );
    let _ = writeln!(output, "    <div class=\"subtitle\">Generated: {generated}</div>");
    if let Some(version) = &assessment.prediction.model_version {
        let _ = writeln!(
            output,
            "    <div class=\"subtitle\">Model: {}</div>",
            html_escape(version)
        );
    }
    let _ = writeln!(output, "</div>");

    let _ = writeln!(output, "<div class=\"section\">");
    let _ = writeln!(output, "    <div class=\"section-title\">Primary Prediction</div>");
    let _ = writeln!(output, "    <div class=\"prediction-box\">");
    let _ = writeln!(
        output,
        "        <div data-icon=\"{}\"><strong>Status:</strong> {}</div>",
        assessment.outcome.icon(),
        assessment.outcome.headline()
    );
    let _ = writeln!(
        output,
        "        <div class=\"main-result\">{} Confidence{confidence_level}</div>",
        percent(assessment.confidence)
    );
    let _ = writeln!(
        output,
        "        <div class=\"confidence\">Risk Level: <span data-icon=\"{}\" class=\"risk-badge {}\">{} Risk</span></div>",
        assessment.risk.icon(),
        assessment.risk.css_class(),
        assessment.risk.label()
    );
    let _ = writeln!(output, "    </div>");
    let _ = writeln!(output, "</div>");

    let _ = writeln!(output, "<div class=\"section\">");
    let _ = writeln!(
        output,
        "    <div class=\"section-title\">Probability Distribution</div>"
    );
    let _ = writeln!(output, "    <table class=\"prob-table\">");
    let _ = writeln!(
        output,
        "        <thead><tr><th>Outcome</th><th>Probability</th></tr></thead>"
    );
    let _ = writeln!(output, "        <tbody>");
    for (label, p) in [
        ("Graduate", probabilities.graduate),
        ("Enrolled (Continuing)", probabilities.enrolled),
        ("Dropout", probabilities.dropout),
    ] {
        let _ = writeln!(
            output,
            "            <tr><td><strong>{label}</strong></td><td>{}</td></tr>",
            percent(p)
        );
    }
    let _ = writeln!(output, "        </tbody>");
    let _ = writeln!(output, "    </table>");
    let _ = writeln!(output, "</div>");

    let _ = writeln!(output, "<div class=\"section\">");
    let _ = writeln!(output, "    <div class=\"section-title\">Student Metrics</div>");
    let _ = writeln!(output, "    <div class=\"metrics-grid\">");
    for (label, value) in metric_cards(assessment) {
        let _ = writeln!(
            output,
            "        <div class=\"metric-card\"><div class=\"label\">{label}</div><div class=\"value\">{value}</div></div>"
        );
    }
    let _ = writeln!(output, "    </div>");
    let _ = writeln!(output, "</div>");

    let _ = writeln!(output, "<div class=\"section\">");
    let _ = writeln!(
        output,
        "    <div class=\"section-title\">Key Student Information</div>"
    );
    let _ = writeln!(output, "    <table class=\"prob-table\">");
    let _ = writeln!(output, "        <tbody>");
    for (label, value) in student_information(&assessment.input) {
        let _ = writeln!(
            output,
            "            <tr><td><strong>{label}</strong></td><td>{}</td></tr>",
            html_escape(&value)
        );
    }
    let _ = writeln!(output, "        </tbody>");
    let _ = writeln!(output, "    </table>");
    let _ = writeln!(output, "</div>");

    write_guidance_html(
        &mut output,
        "Recommendations for Teachers",
        "Based on the prediction analysis, the following actions are recommended:",
        &assessment.recommendations,
    );
    write_guidance_html(
        &mut output,
        "Action Items",
        "Steps for the student over the coming weeks:",
        &assessment.action_items,
    );

    let _ = writeln!(output, "<div class=\"footer\">");
    let _ = writeln!(
        output,
        "    <p><strong>Student Shield</strong> - Success Prediction System</p>"
    );
    let _ = writeln!(output, "    <p>Generated on {generated}</p>");
    let _ = writeln!(output, "</div>");
    let _ = writeln!(
        output,
        "<button class=\"print-btn no-print\" onclick=\"window.print()\">Print Report</button>"
    );
    let _ = writeln!(output, "</body>");
    let _ = writeln!(output, "</html>");

    output
}

fn write_guidance_html(output: &mut String, title: &str, lead: &str, items: &[Guidance]) {
    let _ = writeln!(output, "<div class=\"section\">");
    let _ = writeln!(output, "    <div class=\"section-title\">{title}</div>");
    let _ = writeln!(output, "    <div class=\"recommendations\">");
    let _ = writeln!(
        output,
        "        <p style=\"margin-bottom: 15px; font-weight: 600; color: #92400e;\">{lead}</p>"
    );
    if items.is_empty() {
        let _ = writeln!(
            output,
            "        <p>No specific recommendations available at this time.</p>"
        );
    } else {
        let _ = writeln!(output, "        <ul>");
        for item in items {
            let _ = writeln!(
                output,
                "            <li data-icon=\"{}\">{}</li>",
                item.icon,
                html_escape(item.text)
            );
        }
        let _ = writeln!(output, "        </ul>");
    }
    let _ = writeln!(output, "    </div>");
    let _ = writeln!(output, "</div>");
}
