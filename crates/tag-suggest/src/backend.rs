//! Generation backend trait.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while querying the generation backend.
#[derive(Debug, Error)]
pub enum SuggestError {
    /// Bad or missing configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Backend could not be reached (includes timeouts).
    #[error("network error: {0}")]
    Network(String),

    /// The backend rejected the request or returned garbage.
    #[error("generation failed: {0}")]
    Generation(String),
}

/// A text-generation service that may return a structured JSON payload.
///
/// The contract is deliberately loose: the backend returns either a parsed
/// JSON value or `None` when it produced no structured output. Interpreting
/// the payload is the caller's job.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Option<serde_json::Value>, SuggestError>;
}

/// Backend used when no generation service is configured: it produces no
/// structured output, so every suggestion degrades to "no suggestions".
#[derive(Debug, Clone, Default)]
pub struct DisabledBackend;

#[async_trait]
impl GenerationBackend for DisabledBackend {
    async fn generate(&self, _prompt: &str) -> Result<Option<serde_json::Value>, SuggestError> {
        Ok(None)
    }
}
