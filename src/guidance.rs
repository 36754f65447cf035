use serde::Serialize;

use crate::metrics::normalize_grade;
use crate::models::{FormInput, Guidance, OutcomeProbabilities, RiskLevel, StudentAttributes};

const URGENT_INTERVENTION: [Guidance; 4] = [
    Guidance {
        icon: "priority_high",
        text: "URGENT: Schedule immediate intervention meeting with student and counselor",
    },
    Guidance {
        icon: "support_agent",
        text: "Assign academic mentor for weekly one-on-one support sessions",
    },
    Guidance {
        icon: "psychology",
        text: "Assess for personal challenges (financial, mental health, family issues)",
    },
    Guidance {
        icon: "groups",
        text: "Connect student with peer study groups and academic support resources",
    },
];

const CLOSE_MONITORING: [Guidance; 4] = [
    Guidance {
        icon: "warning",
        text: "Monitor student progress closely and schedule bi-weekly check-ins",
    },
    Guidance {
        icon: "school",
        text: "Provide additional tutoring or study resources for struggling subjects",
    },
    Guidance {
        icon: "calendar_today",
        text: "Help student develop structured study schedule and time management plan",
    },
    Guidance {
        icon: "feedback",
        text: "Increase frequency of assignment feedback to track improvement",
    },
];

const POSITIVE_REINFORCEMENT: [Guidance; 4] = [
    Guidance {
        icon: "stars",
        text: "Recognize and celebrate student achievements to maintain motivation",
    },
    Guidance {
        icon: "trending_up",
        text: "Encourage student to pursue advanced coursework or leadership opportunities",
    },
    Guidance {
        icon: "diversity_3",
        text: "Consider student as peer mentor to support struggling classmates",
    },
    Guidance {
        icon: "check_circle",
        text: "Continue monitoring to ensure sustained academic performance",
    },
];

const GENERAL_MONITORING: [Guidance; 4] = [
    Guidance {
        icon: "visibility",
        text: "Monitor student attendance regularly and address absences promptly",
    },
    Guidance {
        icon: "schedule",
        text: "Encourage consistent study routines and time management strategies",
    },
    Guidance {
        icon: "assignment",
        text: "Provide timely feedback on assignments to improve academic performance",
    },
    Guidance {
        icon: "chat",
        text: "Schedule regular check-ins to identify and address potential challenges early",
    },
];

const MAINTAIN_DEFAULTS: [Guidance; 3] = [
    Guidance {
        icon: "check_circle",
        text: "Maintain current attendance levels",
    },
    Guidance {
        icon: "trending_up",
        text: "Continue consistent study routine",
    },
    Guidance {
        icon: "assignment",
        text: "Keep monitoring academic performance",
    },
];

const ATTENDANCE_ITEM: Guidance = Guidance {
    icon: "event_busy",
    text: "Increase attendance to above 70% for better outcomes",
};
const STUDY_HOURS_ITEM: Guidance = Guidance {
    icon: "schedule",
    text: "Aim for at least 10-15 hours of study per week",
};
const GRADES_ITEM: Guidance = Guidance {
    icon: "school",
    text: "Focus on improving semester grades through active revision",
};
const FAILURES_ITEM: Guidance = Guidance {
    icon: "warning",
    text: "Consider seeking academic support for repeated failures",
};
const COUNSELING_ITEM: Guidance = Guidance {
    icon: "priority_high",
    text: "Immediate intervention recommended - schedule counseling session",
};
const HABITS_ITEM: Guidance = Guidance {
    icon: "check_circle",
    text: "Maintain good attendance and study habits",
};

pub const GRADUATE_LIKELY: f64 = 0.5;
pub const COUNSELING_DROPOUT: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendationBranch {
    UrgentIntervention,
    CloseMonitoring,
    PositiveReinforcement,
    GeneralMonitoring,
}

impl RecommendationBranch {
    /// First match wins: risk level, then a likely graduation.
    pub fn select(risk: RiskLevel, probabilities: &OutcomeProbabilities) -> Self {
        match risk {
            RiskLevel::High => Self::UrgentIntervention,
            RiskLevel::Medium => Self::CloseMonitoring,
            RiskLevel::Low if probabilities.graduate > GRADUATE_LIKELY => {
                Self::PositiveReinforcement
            }
            RiskLevel::Low => Self::GeneralMonitoring,
        }
    }

    pub fn items(&self) -> &'static [Guidance] {
        match self {
            Self::UrgentIntervention => &URGENT_INTERVENTION,
            Self::CloseMonitoring => &CLOSE_MONITORING,
            Self::PositiveReinforcement => &POSITIVE_REINFORCEMENT,
            Self::GeneralMonitoring => &GENERAL_MONITORING,
        }
    }
}

/// `risk` must come from `classify_risk` on the same probabilities.
pub fn recommend(risk: RiskLevel, probabilities: &OutcomeProbabilities) -> Vec<Guidance> {
    RecommendationBranch::select(risk, probabilities)
        .items()
        .to_vec()
}

pub fn action_items(attrs: &StudentAttributes, probabilities: &OutcomeProbabilities) -> Vec<Guidance> {
    let attendance = attrs.attendance_percentage;
    let hours = attrs.study_hours_per_week;
    let low_grade = attrs
        .semester_grades()
        .into_iter()
        .map(normalize_grade)
        .any(|grade| grade > 0.0 && grade < 7.0);

    let mut items = Vec::new();
    if attendance < 60.0 {
        items.push(ATTENDANCE_ITEM);
    }
    if hours < 5.0 {
        items.push(STUDY_HOURS_ITEM);
    }
    if low_grade {
        items.push(GRADES_ITEM);
    }
    if attrs.previous_failures > 1.0 {
        items.push(FAILURES_ITEM);
    }
    if probabilities.dropout > COUNSELING_DROPOUT {
        items.push(COUNSELING_ITEM);
    }

    if items.is_empty() {
        return MAINTAIN_DEFAULTS.to_vec();
    }

    if attendance >= 70.0 && hours >= 10.0 {
        items.push(HABITS_ITEM);
    }
    items
}

pub const DEFAULT_FACT: &str = "Consistent study routines are linked with higher graduation rates.";

pub fn did_you_know(input: &FormInput) -> &'static str {
    if input.is_empty() {
        return DEFAULT_FACT;
    }

    let attrs = StudentAttributes::from_form(input);
    if attrs.attendance_percentage < 60.0 {
        return "Did you know? Students with better than 70% attendance are 3x more likely to graduate.";
    }
    if attrs.study_hours_per_week < 5.0 {
        return "Did you know? Studying just 30 minutes more per day significantly improves performance.";
    }
    if attrs.previous_failures > 1.0 {
        return "Did you know? Early intervention after repeated failures greatly increases success rates.";
    }
    if attrs
        .semester_grades()
        .into_iter()
        .any(|grade| normalize_grade(grade) < 7.0)
    {
        return "Did you know? Students who practice active revision improve grades by 15%.";
    }
    DEFAULT_FACT
}

const MOTIVATIONAL_QUOTES: [&str; 5] = [
    "Small progress each day adds up to big results.",
    "Your future is created by what you do today.",
    "Believe in your ability to improve.",
    "Success comes from consistent effort.",
    "Every step forward counts.",
];

pub fn motivation(seed: u64) -> &'static str {
    MOTIVATIONAL_QUOTES[(seed % MOTIVATIONAL_QUOTES.len() as u64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fields;
    use crate::risk::classify_risk;

    fn steady_student() -> StudentAttributes {
        let mut attrs = StudentAttributes::default();
        attrs.attendance_percentage = 100.0;
        attrs.study_hours_per_week = 20.0;
        attrs.grade_1st = 9.0;
        attrs.grade_2nd = 9.0;
        attrs.previous_failures = 0.0;
        attrs
    }

    fn branch(dropout: f64, graduate: f64) -> RecommendationBranch {
        let probs = OutcomeProbabilities::new(dropout, 0.0, graduate);
        RecommendationBranch::select(classify_risk(&probs), &probs)
    }

    #[test]
    fn branch_selection_is_first_match() {
        assert_eq!(branch(0.8, 0.9), RecommendationBranch::UrgentIntervention);
        assert_eq!(branch(0.3, 0.9), RecommendationBranch::CloseMonitoring);
        assert_eq!(branch(0.1, 0.7), RecommendationBranch::PositiveReinforcement);
        assert_eq!(branch(0.1, 0.5), RecommendationBranch::GeneralMonitoring);
        assert_eq!(branch(0.2, 0.4), RecommendationBranch::GeneralMonitoring);
    }

    #[test]
    fn every_probability_pair_lands_in_one_branch_of_four_items() {
        let steps: Vec<f64> = (0..=20).map(|i| i as f64 * 0.05).collect();
        for &dropout in &steps {
            for &graduate in &steps {
                let probs = OutcomeProbabilities::new(dropout, 0.0, graduate);
                let recs = recommend(classify_risk(&probs), &probs);
                assert_eq!(recs.len(), 4);
                let expected = if dropout > 0.5 {
                    RecommendationBranch::UrgentIntervention
                } else if dropout > 0.2 {
                    RecommendationBranch::CloseMonitoring
                } else if graduate > 0.5 {
                    RecommendationBranch::PositiveReinforcement
                } else {
                    RecommendationBranch::GeneralMonitoring
                };
                assert_eq!(recs, expected.items().to_vec());
            }
        }
    }

    #[test]
    fn steady_student_gets_the_three_defaults() {
        let probs = OutcomeProbabilities::new(0.1, 0.2, 0.7);
        let items = action_items(&steady_student(), &probs);
        assert_eq!(items, MAINTAIN_DEFAULTS.to_vec());
    }

    #[test]
    fn every_trigger_fires_once() {
        let mut attrs = StudentAttributes::default();
        attrs.attendance_percentage = 40.0;
        attrs.study_hours_per_week = 2.0;
        attrs.grade_1st = 10.0;
        attrs.grade_2nd = 5.0;
        attrs.previous_failures = 3.0;
        let probs = OutcomeProbabilities::new(0.8, 0.1, 0.1);

        let items = action_items(&attrs, &probs);
        assert_eq!(
            items,
            vec![
                ATTENDANCE_ITEM,
                STUDY_HOURS_ITEM,
                GRADES_ITEM,
                FAILURES_ITEM,
                COUNSELING_ITEM
            ]
        );
    }

    #[test]
    fn bonus_item_needs_a_trigger_and_good_habits() {
        let mut attrs = steady_student();
        attrs.previous_failures = 2.0;
        let probs = OutcomeProbabilities::new(0.1, 0.2, 0.7);

        let items = action_items(&attrs, &probs);
        assert_eq!(items, vec![FAILURES_ITEM, HABITS_ITEM]);

        attrs.study_hours_per_week = 8.0;
        let items = action_items(&attrs, &probs);
        assert_eq!(items, vec![FAILURES_ITEM]);
    }

    #[test]
    fn grade_trigger_uses_normalized_scale() {
        let mut attrs = steady_student();
        attrs.grade_1st = 16.0;
        attrs.grade_2nd = 12.0;
        let probs = OutcomeProbabilities::new(0.1, 0.2, 0.7);
        let items = action_items(&attrs, &probs);
        assert_eq!(items, vec![GRADES_ITEM, HABITS_ITEM]);

        attrs.grade_2nd = 0.0;
        let items = action_items(&attrs, &probs);
        assert_eq!(items, MAINTAIN_DEFAULTS.to_vec());
    }

    #[test]
    fn facts_use_first_matching_rule() {
        assert_eq!(did_you_know(&FormInput::default()), DEFAULT_FACT);

        let input = FormInput::from_pairs([(fields::ATTENDANCE, "50"), (fields::STUDY_HOURS, "1")]);
        assert!(did_you_know(&input).contains("70% attendance"));

        let input = FormInput::from_pairs([
            (fields::ATTENDANCE, "90"),
            (fields::STUDY_HOURS, "12"),
            (fields::PREVIOUS_FAILURES, "2"),
        ]);
        assert!(did_you_know(&input).contains("repeated failures"));

        let input = FormInput::from_pairs([
            (fields::ATTENDANCE, "90"),
            (fields::STUDY_HOURS, "12"),
            (fields::GRADE_1ST, "18"),
            (fields::GRADE_2ND, "17"),
        ]);
        assert_eq!(did_you_know(&input), DEFAULT_FACT);

        let input = FormInput::from_pairs([
            (fields::ATTENDANCE, "90"),
            (fields::STUDY_HOURS, "12"),
            (fields::GRADE_1ST, "18"),
        ]);
        assert!(did_you_know(&input).contains("active revision"));
    }

    #[test]
    fn motivation_cycles_through_quotes() {
        assert_eq!(motivation(0), MOTIVATIONAL_QUOTES[0]);
        assert_eq!(motivation(7), MOTIVATIONAL_QUOTES[2]);
    }
}
