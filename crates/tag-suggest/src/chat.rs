//! Chat-completions generation backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::api_types::{
    ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat,
};
use crate::backend::{GenerationBackend, SuggestError};
use crate::config::SuggestConfig;

const SYSTEM_PROMPT: &str = "You respond with a single JSON object of the form \
{\"suggestedTags\": [\"tag\", ...]} and nothing else.";

/// Backend that queries an OpenAI-compatible chat-completions endpoint.
///
/// Requests carry a bounded timeout; a transport failure (including the
/// timeout) is retried at most `max_retries` times before giving up.
pub struct ChatCompletionsBackend {
    client: Client,
    config: SuggestConfig,
}

impl ChatCompletionsBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: SuggestConfig) -> Result<Self, SuggestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                SuggestError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Create a backend from environment variables.
    ///
    /// See [`SuggestConfig::from_env`] for the variables involved.
    pub fn from_env() -> Result<Self, SuggestError> {
        Self::new(SuggestConfig::from_env()?)
    }

    async fn chat_completion(&self, prompt: &str) -> Result<ChatCompletionResponse, SuggestError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: Some(ResponseFormat::json_object()),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| SuggestError::Network(format!("Failed to send request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(SuggestError::Generation(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error.message
                )));
            }

            return Err(SuggestError::Generation(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SuggestError::Generation(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl GenerationBackend for ChatCompletionsBackend {
    async fn generate(&self, prompt: &str) -> Result<Option<serde_json::Value>, SuggestError> {
        let mut attempt = 0;
        let completion = loop {
            match self.chat_completion(prompt).await {
                Ok(completion) => break completion,
                // Transport failures get one more try; API rejections don't.
                Err(SuggestError::Network(msg)) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        "Generation request failed ({msg}), retry {attempt}/{}",
                        self.config.max_retries
                    );
                }
                Err(e) => return Err(e),
            }
        };

        let content = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref());

        let Some(content) = content else {
            debug!("Backend returned no content");
            return Ok(None);
        };

        match serde_json::from_str(content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                debug!("Backend content was not valid JSON: {e}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_backend_exhausts_retries() {
        // Port 9 (discard) is not listening; both attempts fail fast.
        let config = SuggestConfig::builder()
            .api_key("test-key")
            .api_url("http://127.0.0.1:9")
            .timeout_secs(1)
            .max_retries(1)
            .build();

        let backend = ChatCompletionsBackend::new(config).unwrap();
        let result = backend.generate("prompt").await;
        assert!(matches!(result, Err(SuggestError::Network(_))));
    }
}
