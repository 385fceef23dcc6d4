//! Resolver types.

use repsage_core::{display_name, normalize, ExerciseRecord, MatchKind, MatchResult, Tier};

/// Longest normalized query sent to collaborators, in characters.
pub const MAX_QUERY_CHARS: usize = 200;

/// A single resolution request, normalized once up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveQuery {
    /// Caller's input, untouched.
    pub raw: String,
    /// Lowercase, single-spaced, truncated to [`MAX_QUERY_CHARS`].
    pub normalized: String,
}

impl ResolveQuery {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut normalized = normalize(&raw);
        if let Some((cut, _)) = normalized.char_indices().nth(MAX_QUERY_CHARS) {
            normalized.truncate(cut);
            normalized = normalized.trim_end().to_string();
        }
        Self { raw, normalized }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Human-facing form of the input ("Explosive Jump Squat").
    pub fn display(&self) -> String {
        display_name(&self.normalized)
    }
}

/// What a tier hands back when it accepts the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub record: ExerciseRecord,
    pub confidence: f64,
    pub match_kind: MatchKind,
}

impl Resolution {
    pub fn new(record: ExerciseRecord, confidence: f64, match_kind: MatchKind) -> Self {
        Self {
            record,
            confidence,
            match_kind,
        }
    }

    /// Wrap into the caller-facing envelope. Confidence is clamped to [0, 1]
    /// and the record invariants are enforced one last time.
    pub fn into_result(self, tier: Tier, elapsed_ms: u64) -> MatchResult {
        let confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        MatchResult {
            record: self.record.finalize(),
            confidence,
            match_kind: self.match_kind,
            tier,
            elapsed_ms,
        }
    }
}
