//! Configuration for the chat-completions backend.

use std::env;

use crate::backend::SuggestError;

/// Configuration for [`crate::ChatCompletionsBackend`].
#[derive(Debug, Clone)]
pub struct SuggestConfig {
    /// API base URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Maximum tokens for the response.
    pub max_tokens: Option<u32>,

    /// Temperature for generation.
    pub temperature: Option<f32>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Retries after a transport failure. The total attempt count is
    /// `1 + max_retries`.
    pub max_retries: u32,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.x.ai".to_string(),
            api_key: String::new(),
            model: "grok-4-1-fast".to_string(),
            max_tokens: Some(256),
            temperature: Some(0.3),
            timeout_secs: 10,
            max_retries: 1,
        }
    }
}

impl SuggestConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `SUGGEST_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `SUGGEST_API_URL` - API URL (default: https://api.x.ai)
    /// - `SUGGEST_MODEL` - Model name (default: grok-4-1-fast)
    /// - `SUGGEST_MAX_TOKENS` - Max tokens (default: 256)
    /// - `SUGGEST_TEMPERATURE` - Temperature (default: 0.3)
    /// - `SUGGEST_TIMEOUT_SECS` - Request timeout (default: 10)
    /// - `SUGGEST_MAX_RETRIES` - Retries after transport failure (default: 1)
    pub fn from_env() -> Result<Self, SuggestError> {
        let api_key = env::var("SUGGEST_API_KEY")
            .map_err(|_| SuggestError::Configuration("SUGGEST_API_KEY not set".to_string()))?;

        let defaults = Self::default();

        let api_url = env::var("SUGGEST_API_URL").unwrap_or(defaults.api_url);
        let model = env::var("SUGGEST_MODEL").unwrap_or(defaults.model);

        let max_tokens = env::var("SUGGEST_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(defaults.max_tokens);

        let temperature = env::var("SUGGEST_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(defaults.temperature);

        let timeout_secs = env::var("SUGGEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        let max_retries = env::var("SUGGEST_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_retries);

        Ok(Self {
            api_url,
            api_key,
            model,
            max_tokens,
            temperature,
            timeout_secs,
            max_retries,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> SuggestConfigBuilder {
        SuggestConfigBuilder::default()
    }
}

/// Builder for [`SuggestConfig`].
#[derive(Debug, Default)]
pub struct SuggestConfigBuilder {
    config: SuggestConfig,
}

impl SuggestConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Set the retry count.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SuggestConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = SuggestConfig::builder().api_key("test-key").build();
        assert_eq!(config.api_url, "https://api.x.ai");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn test_builder_overrides() {
        let config = SuggestConfig::builder()
            .api_key("test-key")
            .api_url("http://localhost:9999")
            .model("test-model")
            .timeout_secs(2)
            .max_retries(0)
            .build();
        assert_eq!(config.api_url, "http://localhost:9999");
        assert_eq!(config.model, "test-model");
        assert_eq!(config.max_retries, 0);
    }
}
