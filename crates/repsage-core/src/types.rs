//! Exercise records and the result envelope returned by the resolver.

use serde::{Deserialize, Serialize};

use crate::body_parts::{body_parts_for, FULL_BODY};
use crate::name::slug;

/// Equipment label used when nothing else is known.
pub const DEFAULT_EQUIPMENT: &str = "bodyweight";

/// Safe-form boilerplate used whenever a record has no instructions of its own.
pub const SAFE_FORM_INSTRUCTIONS: &[&str] = &[
    "Warm up for 5-10 minutes before starting.",
    "Set up in a stable position with a neutral spine.",
    "Move through a controlled, pain-free range of motion.",
    "Breathe steadily: exhale on the effort, inhale on the return.",
    "Stop immediately if you feel sharp pain or dizziness.",
];

/// Pipeline stage that produced a result, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Literal catalog match.
    Exact,
    /// Approximate catalog match above the fuzzy floor.
    Fuzzy,
    /// Generative alternatives (or their cached mapping) resolved in the catalog.
    Semantic,
    /// Movement-pattern keyword rule with a fallback exercise.
    Classification,
    /// Synthesized content; terminal stage.
    Generated,
}

impl Tier {
    /// Every tier, in the order the pipeline tries them.
    pub const PIPELINE: [Tier; 5] = [
        Tier::Exact,
        Tier::Fuzzy,
        Tier::Semantic,
        Tier::Classification,
        Tier::Generated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::Semantic => "semantic",
            Self::Classification => "classification",
            Self::Generated => "generated",
        }
    }

    /// Position in [`Tier::PIPELINE`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse quality of a match, independent of the tier that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    /// Approximation or AI-generated, unverified content.
    Partial,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Fuzzy => write!(f, "fuzzy"),
            Self::Partial => write!(f, "partial"),
        }
    }
}

/// A resolved exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Opaque reference to a demonstration asset (GIF URL, asset key, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_ref: Option<String>,
    #[serde(default)]
    pub target_muscles: Vec<String>,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    #[serde(default)]
    pub body_parts: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_tips: Vec<String>,
}

impl ExerciseRecord {
    /// Empty record for `name`; call [`ExerciseRecord::finalize`] once populated.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            visual_ref: None,
            target_muscles: Vec::new(),
            secondary_muscles: Vec::new(),
            body_parts: Vec::new(),
            equipment: Vec::new(),
            instructions: Vec::new(),
            description: None,
            safety_tips: Vec::new(),
        }
    }

    /// Record with only the generic defaults: full body, bodyweight, safe-form steps.
    pub fn minimal(name: impl Into<String>) -> Self {
        Self::new(name).finalize()
    }

    /// Enforce record invariants: id present, lists trimmed and de-duplicated,
    /// non-empty muscles/equipment/instructions, body parts derived from muscles.
    pub fn finalize(mut self) -> Self {
        if self.id.trim().is_empty() {
            self.id = slug(&self.name);
        }
        self.visual_ref = self.visual_ref.filter(|v| !v.trim().is_empty());

        self.target_muscles = clean_labels(self.target_muscles);
        if self.target_muscles.is_empty() {
            self.target_muscles.push(FULL_BODY.to_string());
        }
        self.secondary_muscles = clean_labels(self.secondary_muscles)
            .into_iter()
            .filter(|m| !self.target_muscles.contains(m))
            .collect();
        self.body_parts = body_parts_for(&self.target_muscles);

        self.equipment = clean_labels(self.equipment);
        if self.equipment.is_empty() {
            self.equipment.push(DEFAULT_EQUIPMENT.to_string());
        }

        self.instructions.retain(|step| !step.trim().is_empty());
        if self.instructions.is_empty() {
            self.instructions = SAFE_FORM_INSTRUCTIONS.iter().map(|s| s.to_string()).collect();
        }
        self.safety_tips.retain(|tip| !tip.trim().is_empty());
        self
    }
}

/// Lowercase, trim and de-duplicate labels, keeping first-seen order.
fn clean_labels(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim().to_lowercase();
        if !label.is_empty() && !out.contains(&label) {
            out.push(label);
        }
    }
    out
}

/// Outer envelope returned for every resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub record: ExerciseRecord,
    /// Certainty in [0, 1].
    pub confidence: f64,
    pub match_kind: MatchKind,
    pub tier: Tier,
    /// Wall-clock duration of the full pipeline call.
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_fills_defaults() {
        let record = ExerciseRecord::minimal("Mystery Move");
        assert_eq!(record.id, "mystery-move");
        assert_eq!(record.target_muscles, vec![FULL_BODY]);
        assert_eq!(record.body_parts, vec![FULL_BODY]);
        assert_eq!(record.equipment, vec![DEFAULT_EQUIPMENT]);
        assert_eq!(record.instructions.len(), SAFE_FORM_INSTRUCTIONS.len());
        assert!(record.visual_ref.is_none());
    }

    #[test]
    fn test_finalize_keeps_content() {
        let mut record = ExerciseRecord::new("Goblet Squat");
        record.id = "ex-0042".into();
        record.visual_ref = Some("  ".into());
        record.target_muscles = vec!["Quads".into(), "glutes".into(), "quads".into()];
        record.secondary_muscles = vec!["glutes".into(), "Core".into()];
        record.equipment = vec!["dumbbell".into()];
        record.instructions = vec!["Hold the bell at your chest.".into(), " ".into()];

        let record = record.finalize();
        assert_eq!(record.id, "ex-0042");
        assert!(record.visual_ref.is_none());
        assert_eq!(record.target_muscles, vec!["quads", "glutes"]);
        assert_eq!(record.secondary_muscles, vec!["core"]);
        assert_eq!(record.body_parts, vec!["upper legs"]);
        assert_eq!(record.equipment, vec!["dumbbell"]);
        assert_eq!(record.instructions, vec!["Hold the bell at your chest."]);
    }

    #[test]
    fn test_tier_pipeline_order() {
        for (i, tier) in Tier::PIPELINE.iter().enumerate() {
            assert_eq!(tier.index(), i);
        }
        assert_eq!(Tier::Classification.to_string(), "classification");
    }

    #[test]
    fn test_match_result_serializes_camel_case() {
        let result = MatchResult {
            record: ExerciseRecord::minimal("Plank"),
            confidence: 0.5,
            match_kind: MatchKind::Partial,
            tier: Tier::Generated,
            elapsed_ms: 12,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["matchKind"], "partial");
        assert_eq!(json["tier"], "generated");
        assert_eq!(json["elapsedMs"], 12);
        assert!(json["record"]["targetMuscles"].is_array());
        assert!(json["record"].get("visualRef").is_none());
    }
}
