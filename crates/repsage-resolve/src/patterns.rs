//! Movement-pattern keyword table.
//!
//! Rules are checked in table order and the first rule with a keyword that is
//! a substring of the input wins. The input is normalized and padded with one
//! space on each side, so a keyword with a leading or trailing space only
//! matches at a word boundary (`" row"` matches "bent over row" and "rowing"
//! but not "narrow" or "throw"). More specific rules come first: "leg press"
//! is a squat, not a push.

use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementPattern {
    Push,
    Pull,
    Squat,
    Hinge,
    Rotation,
    Carry,
}

impl std::fmt::Display for MovementPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Pull => write!(f, "pull"),
            Self::Squat => write!(f, "squat"),
            Self::Hinge => write!(f, "hinge"),
            Self::Rotation => write!(f, "rotation"),
            Self::Carry => write!(f, "carry"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Moderate,
    High,
}

/// Tags attached to a matched rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatternClassification {
    pub movement: MovementPattern,
    pub muscle_groups: &'static [&'static str],
    pub equipment: &'static [&'static str],
    pub intensity: Intensity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatternRule {
    pub keywords: &'static [&'static str],
    pub classification: PatternClassification,
    /// Catalog name used to fetch a representative record and visual.
    pub fallback_exercise_name: &'static str,
}

/// The rule table, in precedence order.
pub static PATTERN_RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule {
            keywords: &["carry", "farmer", "suitcase", "yoke"],
            classification: PatternClassification {
                movement: MovementPattern::Carry,
                muscle_groups: &["forearms", "traps", "core"],
                equipment: &["dumbbell", "kettlebell"],
                intensity: Intensity::Moderate,
            },
            fallback_exercise_name: "farmer carry",
        },
        PatternRule {
            keywords: &["twist", "rotation", "woodchop", "wood chop", "russian", "pallof", "windmill"],
            classification: PatternClassification {
                movement: MovementPattern::Rotation,
                muscle_groups: &["obliques", "abs"],
                equipment: &["bodyweight", "cable", "medicine ball"],
                intensity: Intensity::Low,
            },
            fallback_exercise_name: "russian twist",
        },
        PatternRule {
            keywords: &["deadlift", "hinge", "romanian", "good morning", "hip thrust", "swing", "bridge"],
            classification: PatternClassification {
                movement: MovementPattern::Hinge,
                muscle_groups: &["hamstrings", "glutes", "lower back"],
                equipment: &["barbell", "dumbbell", "kettlebell"],
                intensity: Intensity::High,
            },
            fallback_exercise_name: "deadlift",
        },
        PatternRule {
            keywords: &["squat", "lunge", "leg press", "step up", "pistol", "wall sit"],
            classification: PatternClassification {
                movement: MovementPattern::Squat,
                muscle_groups: &["quads", "glutes", "hamstrings"],
                equipment: &["bodyweight", "barbell", "dumbbell"],
                intensity: Intensity::High,
            },
            fallback_exercise_name: "squat",
        },
        PatternRule {
            keywords: &["pull", " row", "chin up", "curl"],
            classification: PatternClassification {
                movement: MovementPattern::Pull,
                muscle_groups: &["lats", "upper back", "biceps"],
                equipment: &["pull-up bar", "cable", "dumbbell"],
                intensity: Intensity::Moderate,
            },
            fallback_exercise_name: "pull up",
        },
        PatternRule {
            keywords: &["push", "press", "dip", "bench", "fly", "tricep"],
            classification: PatternClassification {
                movement: MovementPattern::Push,
                muscle_groups: &["chest", "shoulders", "triceps"],
                equipment: &["bodyweight", "barbell", "dumbbell"],
                intensity: Intensity::Moderate,
            },
            fallback_exercise_name: "push up",
        },
    ]
});

/// First rule matching an already-normalized input, if any.
pub fn classify(normalized: &str) -> Option<&'static PatternRule> {
    if normalized.trim().is_empty() {
        return None;
    }
    let haystack = format!(" {} ", normalized);
    PATTERN_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| haystack.contains(kw)))
}
