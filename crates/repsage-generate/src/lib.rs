//! RepSage Generate: structured generation for the exercise resolver.
//!
//! Defines the `GenerativeBackend` collaborator, the prompts and schemas the
//! resolver sends through it, and strict validation of what comes back.
//! LLM calls go to external APIs; no local model is required.

pub mod adapter;
pub mod backend;
pub mod config;
pub mod prompts;
pub mod providers;
pub mod schema;
pub mod types;

pub use adapter::{suggest_alternatives, synthesize_exercise};
pub use backend::{create_backend, GenerativeBackend, LlmBackend, NoopBackend};
pub use config::LLMConfig;
pub use schema::{AlternativesResponse, GeneratedExercise, ParseError, SchemaDescriptor};
pub use types::*;
