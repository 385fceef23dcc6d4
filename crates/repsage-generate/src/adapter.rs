//! Typed requests on top of a [`GenerativeBackend`].
//!
//! Both functions validate the backend's JSON before returning, so callers
//! only ever see [`AlternativesResponse`] or [`GeneratedExercise`].

use tracing::debug;

use crate::backend::GenerativeBackend;
use crate::prompts::{alternatives_prompt, exercise_prompt};
use crate::schema::{AlternativesResponse, GeneratedExercise, SchemaDescriptor};
use repsage_core::{Error, Result};

/// Ask for standard exercise names matching a free-text query.
pub async fn suggest_alternatives(
    backend: &dyn GenerativeBackend,
    query: &str,
) -> Result<AlternativesResponse> {
    let schema = SchemaDescriptor::exercise_alternatives();
    let value = backend.generate(&alternatives_prompt(query), &schema).await?;
    let parsed = AlternativesResponse::from_value(value)
        .map_err(|e| Error::Schema(format!("{}: {}", schema.name, e)))?;
    debug!("Alternatives for '{}': {:?}", query, parsed.alternatives);
    Ok(parsed)
}

/// Ask for a complete exercise description for a free-text query.
pub async fn synthesize_exercise(
    backend: &dyn GenerativeBackend,
    query: &str,
) -> Result<GeneratedExercise> {
    let schema = SchemaDescriptor::generated_exercise();
    let value = backend.generate(&exercise_prompt(query), &schema).await?;
    GeneratedExercise::from_value(value).map_err(|e| Error::Schema(format!("{}: {}", schema.name, e)))
}
