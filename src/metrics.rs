use crate::models::{KeyFactor, StudentAttributes, StudentMetrics, MAX_HOBBY_RATING};

pub const MAX_GRADE: f64 = 10.0;
pub const FINANCIAL_BASELINE: f64 = 50.0;

/// Bounds `value` to `[min, max]`. NaN maps to `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Grades above 10 are read as the 0-20 scale and halved.
pub fn normalize_grade(raw: f64) -> f64 {
    let grade = if raw > MAX_GRADE { raw / 2.0 } else { raw };
    clamp(grade, 0.0, MAX_GRADE)
}

/// Mean of the normalized semester grades, skipping grades that are not above zero.
pub fn average_grade(attrs: &StudentAttributes) -> f64 {
    let grades: Vec<f64> = attrs
        .semester_grades()
        .into_iter()
        .filter(|grade| *grade > 0.0)
        .map(normalize_grade)
        .collect();
    mean(&grades)
}

pub fn compute_metrics(attrs: &StudentAttributes) -> StudentMetrics {
    let avg_grade = average_grade(attrs);
    let grade_score = clamp(avg_grade / MAX_GRADE * 100.0, 0.0, 100.0);

    let total_enrolled = attrs.enrolled_1st + attrs.enrolled_2nd;
    let total_approved = attrs.approved_1st + attrs.approved_2nd;
    let approval_rate = if total_enrolled > 0.0 {
        total_approved / total_enrolled
    } else {
        0.0
    };
    let approval_score = clamp(approval_rate * 100.0, 0.0, 100.0);

    let financial_score = financial_score(
        attrs.tuition_up_to_date,
        attrs.scholarship_holder,
        attrs.debtor,
    );

    let engagement_average = mean(&attrs.hobbies);
    let engagement_score = clamp(engagement_average / MAX_HOBBY_RATING * 100.0, 0.0, 100.0);

    StudentMetrics {
        avg_grade,
        grade_score,
        total_enrolled,
        total_approved,
        approval_rate,
        approval_score,
        tuition_up_to_date: attrs.tuition_up_to_date,
        has_scholarship: attrs.scholarship_holder,
        is_debtor: attrs.debtor,
        financial_score,
        engagement_average,
        engagement_score,
    }
}

pub fn financial_score(tuition_up_to_date: bool, has_scholarship: bool, is_debtor: bool) -> f64 {
    let mut score = FINANCIAL_BASELINE;
    score += if tuition_up_to_date { 25.0 } else { -25.0 };
    if has_scholarship {
        score += 15.0;
    }
    if is_debtor {
        score -= 20.0;
    }
    clamp(score, 0.0, 100.0)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn financial_description(metrics: &StudentMetrics) -> String {
    let mut states = vec![
        if metrics.tuition_up_to_date {
            "Tuition fees are up to date"
        } else {
            "Outstanding tuition detected"
        },
        if metrics.has_scholarship {
            "Scholarship support active"
        } else {
            "No scholarship reported"
        },
    ];
    if metrics.is_debtor {
        states.push("Debtor status requires attention");
    }
    states.join(" · ")
}

/// The four factor cards shown next to a prediction.
pub fn key_factors(metrics: &StudentMetrics) -> Vec<KeyFactor> {
    let grades = if metrics.avg_grade > 0.0 {
        KeyFactor {
            label: "Semester Grades",
            icon: "school",
            score: metrics.grade_score,
            badge: format!("{:.1}/10", metrics.avg_grade),
            description: format!(
                "Average semester grade of {:.1} out of 10.",
                metrics.avg_grade
            ),
        }
    } else {
        KeyFactor {
            label: "Semester Grades",
            icon: "school",
            score: metrics.grade_score,
            badge: "N/A".to_string(),
            description: "Add semester grades to calculate academic performance.".to_string(),
        }
    };

    let approvals = if metrics.total_enrolled > 0.0 {
        KeyFactor {
            label: "Units Approved",
            icon: "assignment_turned_in",
            score: metrics.approval_score,
            badge: format!("{}/{}", metrics.total_approved, metrics.total_enrolled),
            description: format!(
                "{} of {} units approved across the last two semesters.",
                metrics.total_approved, metrics.total_enrolled
            ),
        }
    } else {
        KeyFactor {
            label: "Units Approved",
            icon: "assignment_turned_in",
            score: metrics.approval_score,
            badge: "N/A".to_string(),
            description: "Provide enrolled and approved units to evaluate progress.".to_string(),
        }
    };

    let financial_badge = if metrics.tuition_up_to_date && !metrics.is_debtor {
        "Good"
    } else if metrics.is_debtor {
        "At Risk"
    } else {
        "Fair"
    };

    let engagement_description = if metrics.engagement_average > 0.0 {
        "Extracurricular involvement level based on self-reported hobbies."
    } else {
        "Adjust hobby ratings to capture engagement."
    };

    vec![
        grades,
        approvals,
        KeyFactor {
            label: "Financial Stability",
            icon: "payments",
            score: metrics.financial_score,
            badge: financial_badge.to_string(),
            description: financial_description(metrics),
        },
        KeyFactor {
            label: "Engagement & Hobbies",
            icon: "diversity_3",
            score: metrics.engagement_score,
            badge: format!("{:.1}/5", metrics.engagement_average),
            description: engagement_description.to_string(),
        },
    ]
}
