//! Output schemas and boundary validation for generative responses.
//!
//! Raw JSON from a model never leaves this module: it is validated into
//! [`AlternativesResponse`] or [`GeneratedExercise`] or rejected with a
//! [`ParseError`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// How many alternatives the prompts ask for and the parsers keep.
pub const MAX_ALTERNATIVES: usize = 3;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("response contains no JSON object")]
    NoJson,

    #[error("response does not match schema: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("field '{field}' is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Named JSON schema handed to the generative backend.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaDescriptor {
    pub name: &'static str,
    pub schema: Value,
}

impl SchemaDescriptor {
    /// Alternatives + coarse movement classification.
    pub fn exercise_alternatives() -> Self {
        Self {
            name: "exercise_alternatives",
            schema: json!({
                "type": "object",
                "required": ["alternatives", "movementPattern", "equipment"],
                "properties": {
                    "alternatives": {
                        "type": "array",
                        "minItems": 1,
                        "maxItems": MAX_ALTERNATIVES,
                        "items": {
                            "type": "object",
                            "required": ["name"],
                            "properties": {
                                "name": {"type": "string"},
                                "reason": {"type": "string"}
                            }
                        }
                    },
                    "movementPattern": {
                        "type": "string",
                        "enum": ["push", "pull", "squat", "hinge", "rotation", "carry", "other"]
                    },
                    "equipment": {"type": "array", "items": {"type": "string"}}
                }
            }),
        }
    }

    /// Complete synthesized exercise.
    pub fn generated_exercise() -> Self {
        Self {
            name: "generated_exercise",
            schema: json!({
                "type": "object",
                "required": ["name", "description", "instructions", "equipment", "targetMuscles"],
                "properties": {
                    "name": {"type": "string"},
                    "description": {"type": "string"},
                    "instructions": {
                        "type": "array", "minItems": 1, "maxItems": 8,
                        "items": {"type": "string"}
                    },
                    "equipment": {"type": "array", "items": {"type": "string"}},
                    "targetMuscles": {"type": "array", "items": {"type": "string"}},
                    "secondaryMuscles": {"type": "array", "items": {"type": "string"}},
                    "safetyTips": {"type": "array", "items": {"type": "string"}},
                    "alternatives": {
                        "type": "array", "maxItems": MAX_ALTERNATIVES,
                        "items": {"type": "string"}
                    }
                }
            }),
        }
    }
}

/// Validated answer to the alternatives prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativesResponse {
    /// Candidate standard names, most likely first.
    pub alternatives: Vec<String>,
    pub movement_pattern: Option<String>,
    pub equipment: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAlternative {
    Named { name: String },
    Plain(String),
}

#[derive(Deserialize)]
struct RawAlternatives {
    alternatives: Vec<RawAlternative>,
    #[serde(default, alias = "movement_pattern", rename = "movementPattern")]
    movement_pattern: Option<String>,
    #[serde(default)]
    equipment: Vec<String>,
}

impl AlternativesResponse {
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        let raw: RawAlternatives = serde_json::from_value(value)?;

        let mut alternatives: Vec<String> = Vec::new();
        for alt in raw.alternatives {
            let name = match alt {
                RawAlternative::Named { name } => name,
                RawAlternative::Plain(name) => name,
            };
            let name = name.trim().to_string();
            if !name.is_empty() && !alternatives.iter().any(|a| a.eq_ignore_ascii_case(&name)) {
                alternatives.push(name);
            }
        }
        if alternatives.is_empty() {
            return Err(ParseError::InvalidField {
                field: "alternatives",
                reason: "no non-empty names".into(),
            });
        }
        alternatives.truncate(MAX_ALTERNATIVES);

        Ok(Self {
            alternatives,
            movement_pattern: raw
                .movement_pattern
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty()),
            equipment: clean_list(raw.equipment),
        })
    }
}

/// Validated synthesized exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedExercise {
    pub name: String,
    pub description: String,
    pub instructions: Vec<String>,
    pub equipment: Vec<String>,
    pub target_muscles: Vec<String>,
    pub secondary_muscles: Vec<String>,
    pub safety_tips: Vec<String>,
    pub alternatives: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExercise {
    name: String,
    #[serde(default)]
    description: String,
    instructions: Vec<String>,
    #[serde(default)]
    equipment: Vec<String>,
    #[serde(alias = "target_muscles")]
    target_muscles: Vec<String>,
    #[serde(default, alias = "secondary_muscles")]
    secondary_muscles: Vec<String>,
    #[serde(default, alias = "safety_tips")]
    safety_tips: Vec<String>,
    #[serde(default)]
    alternatives: Vec<String>,
}

impl GeneratedExercise {
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        let raw: RawExercise = serde_json::from_value(value)?;

        let name = raw.name.trim().to_string();
        if name.is_empty() {
            return Err(ParseError::InvalidField {
                field: "name",
                reason: "empty".into(),
            });
        }
        let instructions = clean_list(raw.instructions);
        if instructions.is_empty() {
            return Err(ParseError::InvalidField {
                field: "instructions",
                reason: "no non-empty steps".into(),
            });
        }
        let mut alternatives = clean_list(raw.alternatives);
        alternatives.truncate(MAX_ALTERNATIVES);

        Ok(Self {
            name,
            description: raw.description.trim().to_string(),
            instructions,
            equipment: clean_list(raw.equipment),
            target_muscles: clean_list(raw.target_muscles),
            secondary_muscles: clean_list(raw.secondary_muscles),
            safety_tips: clean_list(raw.safety_tips),
            alternatives,
        })
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Pull the JSON object out of a model's text reply, tolerating code fences
/// and leading/trailing prose.
pub fn extract_json(text: &str) -> Result<Value, ParseError> {
    let start = text.find('{').ok_or(ParseError::NoJson)?;
    let end = text.rfind('}').ok_or(ParseError::NoJson)?;
    if end < start {
        return Err(ParseError::NoJson);
    }
    Ok(serde_json::from_str(&text[start..=end])?)
}
