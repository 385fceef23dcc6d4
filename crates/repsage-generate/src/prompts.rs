//! Prompt builders for the two generative requests the resolver makes.

use crate::schema::MAX_ALTERNATIVES;

/// System message shared by every request.
pub const SYSTEM_PROMPT: &str = "You are a certified strength and conditioning coach. \
You map informal or unusual exercise names to standard exercise names found in \
common exercise databases. Always answer with a single JSON object that matches \
the requested schema and nothing else.";

/// Ask for standard-name alternatives plus a coarse classification.
pub fn alternatives_prompt(query: &str) -> String {
    format!(
        "The exercise \"{query}\" was not found in our exercise database.\n\
         Suggest exactly {MAX_ALTERNATIVES} standard exercise names that best match it, most likely first. \
         Prefer simple, widely used names (for example \"Goblet Squat\", \"Push Up\", \"Romanian Deadlift\").\n\
         Also classify the movement pattern as one of: push, pull, squat, hinge, rotation, carry, other; \
         and list the equipment it needs.\n\
         Respond as JSON: {{\"alternatives\": [{{\"name\": string, \"reason\": string}}], \
         \"movementPattern\": string, \"equipment\": [string]}}"
    )
}

/// Ask for a complete exercise description from scratch.
pub fn exercise_prompt(query: &str) -> String {
    format!(
        "Create a complete exercise guide for \"{query}\".\n\
         Include: a clear display name, a one or two sentence description, \
         5 to 6 instruction steps in order (no numbering), the equipment needed \
         (use \"bodyweight\" if none), primary target muscles, secondary muscles, \
         2 to 3 safety tips, and exactly {MAX_ALTERNATIVES} similar standard exercises.\n\
         Respond as JSON: {{\"name\": string, \"description\": string, \"instructions\": [string], \
         \"equipment\": [string], \"targetMuscles\": [string], \"secondaryMuscles\": [string], \
         \"safetyTips\": [string], \"alternatives\": [string]}}"
    )
}
