//! Exercise name normalization.
//!
//! Every lookup key (catalog, semantic cache, pattern table) goes through
//! [`normalize`] so that `"Dumbbell_Goblet  Squat"` and `"dumbbell goblet squat"`
//! land on the same entry.

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_\-]+").unwrap());

/// Lowercase, trim, and collapse runs of whitespace, `_` and `-` into one space.
pub fn normalize(name: &str) -> String {
    SEPARATORS
        .replace_all(name.trim(), " ")
        .trim()
        .to_lowercase()
}

/// Stable identifier derived from a name: normalized words joined by `-`,
/// with anything that is not alphanumeric dropped.
pub fn slug(name: &str) -> String {
    let normalized = normalize(name);
    let words: Vec<String> = normalized
        .split(' ')
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        "exercise".to_string()
    } else {
        words.join("-")
    }
}

/// Human-facing form of a free-text name: separators collapsed, each word
/// capitalized. Falls back to `"Exercise"` for input with no words.
pub fn display_name(name: &str) -> String {
    let normalized = normalize(name);
    if normalized.is_empty() {
        return "Exercise".to_string();
    }
    normalized
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
