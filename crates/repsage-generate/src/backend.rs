//! Generative backend trait and implementations.
//!
//! The `GenerativeBackend` trait abstracts over structured generation.
//! Implementations:
//! - `LlmBackend`: external LLM API (OpenAI / Anthropic / Groq)
//! - `NoopBackend`: always fails; the resolver degrades to offline tiers

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::LLMConfig;
use crate::prompts::SYSTEM_PROMPT;
use crate::providers;
use crate::schema::{extract_json, SchemaDescriptor};
use crate::types::{ChatMessage, ResolvedProvider};
use repsage_core::{Error, Result};

/// Structured generation service.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Run `prompt` and return a JSON object meant to satisfy `schema`.
    /// The caller validates the shape; implementations only guarantee JSON.
    async fn generate(&self, prompt: &str, schema: &SchemaDescriptor) -> Result<Value>;

    /// Whether a call has any chance of succeeding (model configured).
    fn is_available(&self) -> bool {
        true
    }
}

/// Backend that calls an external LLM API.
pub struct LlmBackend {
    client: Client,
    provider: ResolvedProvider,
    temperature: f64,
    max_tokens: usize,
}

impl LlmBackend {
    pub fn new(provider: ResolvedProvider, config: &LLMConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            client,
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl GenerativeBackend for LlmBackend {
    async fn generate(&self, prompt: &str, schema: &SchemaDescriptor) -> Result<Value> {
        let messages = vec![
            ChatMessage::system(format!(
                "{}\nJSON schema ({}):\n{}",
                SYSTEM_PROMPT, schema.name, schema.schema
            )),
            ChatMessage::user(prompt),
        ];

        let text = providers::complete(
            &self.client,
            self.provider.provider,
            &messages,
            &self.provider.model,
            &self.provider.api_key,
            self.temperature,
            self.max_tokens,
        )
        .await?;

        debug!(
            "{} replied to {} with {} chars",
            self.provider.provider,
            schema.name,
            text.len()
        );

        extract_json(&text).map_err(|e| Error::Schema(e.to_string()))
    }
}

/// Backend that is never available.
pub struct NoopBackend;

#[async_trait]
impl GenerativeBackend for NoopBackend {
    async fn generate(&self, _prompt: &str, schema: &SchemaDescriptor) -> Result<Value> {
        Err(Error::Generation(format!(
            "no generative backend configured for {}",
            schema.name
        )))
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Create the best available backend for the given LLM configuration.
///
/// Uses the configured provider when an API key is present, otherwise falls
/// back to `NoopBackend` (catalog and pattern tiers only).
pub fn create_backend(config: &LLMConfig) -> Arc<dyn GenerativeBackend> {
    match config.resolve_provider() {
        Some(provider) => {
            let label = format!("{} ({})", provider.provider, provider.model);
            match LlmBackend::new(provider, config) {
                Ok(backend) => {
                    info!("Using LLM backend: {}", label);
                    return Arc::new(backend);
                }
                Err(e) => {
                    tracing::warn!("LLM backend unavailable: {}. Generation disabled.", e);
                }
            }
        }
        None => {
            info!("No LLM API key configured. Generation disabled.");
        }
    }
    Arc::new(NoopBackend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_backend_fails() {
        let backend = NoopBackend;
        assert!(!backend.is_available());
        let err = backend
            .generate("anything", &SchemaDescriptor::exercise_alternatives())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn test_create_backend_without_keys() {
        let backend = create_backend(&LLMConfig::default());
        assert!(!backend.is_available());
    }

    #[test]
    fn test_create_backend_with_key() {
        let mut config = LLMConfig::default();
        config.groq_api_key = Some("gsk-test".into());
        let backend = create_backend(&config);
        assert!(backend.is_available());
    }
}
