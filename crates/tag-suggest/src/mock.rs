//! Mock generation backends for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::backend::{GenerationBackend, SuggestError};

enum Behavior {
    /// Return a structured payload with these tags.
    Tags(Vec<String>),
    /// Return no structured output.
    Empty,
    /// Fail with a network error.
    Fail(String),
}

/// A canned generation backend. Counts calls so tests can assert whether the
/// backend was consulted at all.
pub struct MockBackend {
    behavior: Behavior,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockBackend {
    /// Backend that always suggests the given tags.
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            behavior: Behavior::Tags(tags.into_iter().map(Into::into).collect()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Backend that returns no structured output.
    pub fn empty() -> Self {
        Self {
            behavior: Behavior::Empty,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Backend that fails every request.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Fail(message.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Delay every response by the given duration.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of generate calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, _prompt: &str) -> Result<Option<serde_json::Value>, SuggestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Tags(tags) => Ok(Some(json!({ "suggestedTags": tags }))),
            Behavior::Empty => Ok(None),
            Behavior::Fail(message) => Err(SuggestError::Network(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_tags() {
        let backend = MockBackend::with_tags(["login", "password"]);
        let value = backend.generate("prompt").await.unwrap().unwrap();
        assert_eq!(value["suggestedTags"][0], "login");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_backend_failure() {
        let backend = MockBackend::failing("boom");
        assert!(backend.generate("prompt").await.is_err());
    }
}
