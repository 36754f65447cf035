use crate::metrics::average_grade;
use crate::models::{Band, Outcome, OutcomeProbabilities, QuickStat, RiskLevel, StudentAttributes};

pub const HIGH_RISK_DROPOUT: f64 = 0.5;
pub const MEDIUM_RISK_DROPOUT: f64 = 0.2;

/// Step function of the dropout probability. Both thresholds are exclusive.
pub fn classify_risk(probabilities: &OutcomeProbabilities) -> RiskLevel {
    match probabilities.dropout {
        p if p > HIGH_RISK_DROPOUT => RiskLevel::High,
        p if p > MEDIUM_RISK_DROPOUT => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

/// Most likely outcome and its probability. Ties favor graduate, then enrolled.
pub fn primary_outcome(probabilities: &OutcomeProbabilities) -> (Outcome, f64) {
    let max = probabilities
        .graduate
        .max(probabilities.enrolled)
        .max(probabilities.dropout);

    if max == probabilities.graduate {
        (Outcome::Graduate, max)
    } else if max == probabilities.enrolled {
        (Outcome::Enrolled, max)
    } else {
        (Outcome::Dropout, max)
    }
}

pub fn attendance_band(attendance: f64) -> Band {
    match attendance {
        a if a < 60.0 => Band::High,
        a if a < 80.0 => Band::Medium,
        _ => Band::Low,
    }
}

pub fn study_hours_band(hours: f64) -> Band {
    match hours {
        h if h < 5.0 => Band::High,
        h if h < 10.0 => Band::Medium,
        _ => Band::Low,
    }
}

pub fn grade_band(avg_grade: f64) -> Band {
    match avg_grade {
        g if g < 7.0 => Band::High,
        g if g < 8.0 => Band::Medium,
        _ => Band::Low,
    }
}

pub fn failures_band(failures: f64) -> Band {
    if failures > 1.0 {
        Band::High
    } else if failures == 1.0 {
        Band::Medium
    } else {
        Band::Low
    }
}

pub fn quick_stats(attrs: &StudentAttributes) -> Vec<QuickStat> {
    let attendance = attrs.attendance_percentage;
    let hours = attrs.study_hours_per_week;
    let avg_grade = average_grade(attrs);
    let failures = attrs.previous_failures;

    vec![
        QuickStat {
            label: "Attendance",
            display: if attendance > 0.0 {
                format!("{attendance:.0}%")
            } else {
                "--".to_string()
            },
            band: attendance_band(attendance),
        },
        QuickStat {
            label: "Study Hours",
            display: if hours > 0.0 {
                format!("{hours}h")
            } else {
                "--".to_string()
            },
            band: study_hours_band(hours),
        },
        QuickStat {
            label: "Avg Grade",
            display: if avg_grade > 0.0 {
                format!("{avg_grade:.1}")
            } else {
                "--".to_string()
            },
            band: grade_band(avg_grade),
        },
        QuickStat {
            label: "Failures",
            display: if failures > 0.0 {
                format!("{failures}")
            } else {
                "0".to_string()
            },
            band: failures_band(failures),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dropout(p: f64) -> OutcomeProbabilities {
        OutcomeProbabilities::new(p, 0.0, 1.0 - p)
    }

    #[test]
    fn risk_is_a_step_function_of_dropout() {
        let cases = [
            (0.0, RiskLevel::Low),
            (0.2, RiskLevel::Low),
            (0.2001, RiskLevel::Medium),
            (0.5, RiskLevel::Medium),
            (0.5001, RiskLevel::High),
            (0.9, RiskLevel::High),
        ];
        for (p, expected) in cases {
            assert_eq!(classify_risk(&dropout(p)), expected, "dropout {p}");
        }
    }

    #[test]
    fn risk_ignores_other_probabilities() {
        let a = OutcomeProbabilities::new(0.3, 0.7, 0.0);
        let b = OutcomeProbabilities::new(0.3, 0.0, 0.7);
        assert_eq!(classify_risk(&a), classify_risk(&b));
    }

    #[test]
    fn primary_outcome_prefers_graduate_on_ties() {
        let (outcome, p) = primary_outcome(&OutcomeProbabilities::new(0.2, 0.4, 0.4));
        assert_eq!(outcome, Outcome::Graduate);
        assert_eq!(p, 0.4);

        let (outcome, _) = primary_outcome(&OutcomeProbabilities::new(0.45, 0.45, 0.1));
        assert_eq!(outcome, Outcome::Enrolled);

        let (outcome, p) = primary_outcome(&OutcomeProbabilities::new(0.7, 0.2, 0.1));
        assert_eq!(outcome, Outcome::Dropout);
        assert_eq!(p, 0.7);
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(attendance_band(59.9), Band::High);
        assert_eq!(attendance_band(60.0), Band::Medium);
        assert_eq!(attendance_band(80.0), Band::Low);
        assert_eq!(study_hours_band(4.0), Band::High);
        assert_eq!(study_hours_band(9.0), Band::Medium);
        assert_eq!(study_hours_band(10.0), Band::Low);
        assert_eq!(grade_band(6.9), Band::High);
        assert_eq!(grade_band(7.5), Band::Medium);
        assert_eq!(grade_band(8.0), Band::Low);
        assert_eq!(failures_band(0.0), Band::Low);
        assert_eq!(failures_band(1.0), Band::Medium);
        assert_eq!(failures_band(2.0), Band::High);
    }

    #[test]
    fn quick_stats_render_placeholders_for_missing_values() {
        let stats = quick_stats(&StudentAttributes::default());
        let displays: Vec<&str> = stats.iter().map(|s| s.display.as_str()).collect();
        assert_eq!(displays, vec!["--", "--", "--", "0"]);
    }

    #[test]
    fn quick_stats_normalize_twenty_point_grades() {
        let mut attrs = StudentAttributes::default();
        attrs.grade_1st = 16.0;
        attrs.grade_2nd = 8.0;
        attrs.attendance_percentage = 92.4;
        attrs.study_hours_per_week = 12.5;
        let stats = quick_stats(&attrs);
        assert_eq!(stats[0].display, "92%");
        assert_eq!(stats[1].display, "12.5h");
        assert_eq!(stats[2].display, "8.0");
        assert_eq!(stats[2].band, Band::Low);
    }
}
