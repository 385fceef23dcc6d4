//! Muscle → body-region mapping.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Region used when no target muscle maps to a known region.
pub const FULL_BODY: &str = "full body";

static MUSCLE_TO_BODY_PART: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for muscle in &["chest", "pectorals", "pecs", "serratus anterior"] {
        m.insert(*muscle, "chest");
    }
    for muscle in &[
        "back", "lats", "latissimus dorsi", "upper back", "lower back", "rhomboids",
        "traps", "trapezius", "spine", "erector spinae",
    ] {
        m.insert(*muscle, "back");
    }
    for muscle in &["shoulders", "delts", "deltoids", "rear delts", "rotator cuff"] {
        m.insert(*muscle, "shoulders");
    }
    for muscle in &["biceps", "triceps", "brachialis"] {
        m.insert(*muscle, "upper arms");
    }
    for muscle in &["forearms", "grip", "wrist flexors"] {
        m.insert(*muscle, "lower arms");
    }
    for muscle in &["abs", "core", "obliques", "abdominals", "transverse abdominis"] {
        m.insert(*muscle, "waist");
    }
    for muscle in &[
        "quads", "quadriceps", "hamstrings", "glutes", "gluteus maximus", "adductors",
        "abductors", "hip flexors", "hips", "legs",
    ] {
        m.insert(*muscle, "upper legs");
    }
    for muscle in &["calves", "soleus", "tibialis anterior", "ankles"] {
        m.insert(*muscle, "lower legs");
    }
    m.insert("neck", "neck");
    m.insert("cardiovascular system", "cardio");
    m.insert("cardio", "cardio");
    m.insert(FULL_BODY, FULL_BODY);
    m
});

/// Derive the ordered, de-duplicated body regions for a list of target muscles.
pub fn body_parts_for(muscles: &[String]) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for muscle in muscles {
        let key = muscle.trim().to_lowercase();
        if let Some(part) = MUSCLE_TO_BODY_PART.get(key.as_str()) {
            if !parts.iter().any(|p| p == part) {
                parts.push(part.to_string());
            }
        }
    }
    if parts.is_empty() {
        parts.push(FULL_BODY.to_string());
    }
    parts
}
