//! The tag suggester.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use ticket_core::TicketStore;

use crate::backend::GenerationBackend;

/// Result of a suggestion request.
///
/// `success: false` covers every degraded path: no exemplar available,
/// backend unreachable, unparseable output, or the request having been
/// superseded by a newer one for the same description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionOutcome {
    pub success: bool,
    pub tags: Vec<String>,
}

impl SuggestionOutcome {
    fn none() -> Self {
        Self {
            success: false,
            tags: Vec::new(),
        }
    }

    fn tags(tags: Vec<String>) -> Self {
        Self {
            success: true,
            tags,
        }
    }
}

/// The structured payload expected from the backend.
#[derive(Debug, Deserialize)]
struct SuggestedTags {
    #[serde(rename = "suggestedTags")]
    suggested_tags: Vec<String>,
}

/// Suggests tags for a new ticket description.
///
/// Stateless request/response mapping apart from in-flight tracking: requests
/// are keyed by a fingerprint of the description, and a later request for the
/// same key supersedes an earlier one instead of queueing behind it.
pub struct TagSuggester {
    store: Arc<dyn TicketStore>,
    backend: Arc<dyn GenerationBackend>,
    in_flight: Mutex<HashMap<String, u64>>,
    counter: AtomicU64,
}

impl TagSuggester {
    /// Create a suggester over a ticket store and a generation backend.
    pub fn new(store: Arc<dyn TicketStore>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            store,
            backend,
            in_flight: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Suggest tags for a new ticket description.
    ///
    /// Never fails: every problem degrades to an unsuccessful outcome with
    /// no tags.
    pub async fn suggest(&self, new_description: &str) -> SuggestionOutcome {
        let key = fingerprint(new_description.trim());
        let seq = self.counter.fetch_add(1, Ordering::SeqCst);
        self.in_flight.lock().await.insert(key.clone(), seq);

        let outcome = self.suggest_inner(new_description).await;

        let mut in_flight = self.in_flight.lock().await;
        match in_flight.get(&key) {
            Some(&latest) if latest != seq => {
                // A newer request for the same description took over.
                debug!("Suggestion request superseded, discarding result");
                SuggestionOutcome::none()
            }
            _ => {
                in_flight.remove(&key);
                outcome
            }
        }
    }

    async fn suggest_inner(&self, new_description: &str) -> SuggestionOutcome {
        let exemplar = match self.store.first_resolved_with_feedback().await {
            Ok(Some(ticket)) => ticket,
            Ok(None) => {
                debug!("No resolved ticket with feedback; skipping suggestion");
                return SuggestionOutcome::none();
            }
            Err(e) => {
                warn!("Exemplar lookup failed: {e}");
                return SuggestionOutcome::none();
            }
        };

        let prompt = build_prompt(&exemplar.description, new_description);

        let value = match self.backend.generate(&prompt).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("Backend returned no structured output");
                return SuggestionOutcome::none();
            }
            Err(e) => {
                warn!("Tag suggestion backend failed: {e}");
                return SuggestionOutcome::none();
            }
        };

        match serde_json::from_value::<SuggestedTags>(value) {
            Ok(parsed) => SuggestionOutcome::tags(parsed.suggested_tags),
            Err(e) => {
                debug!("Backend payload did not match the tag schema: {e}");
                SuggestionOutcome::none()
            }
        }
    }
}

/// Build the tagging prompt from the exemplar and the new description.
fn build_prompt(resolved_description: &str, new_description: &str) -> String {
    format!(
        "You are a ticket tagging expert. Based on the description of a previously \
         resolved ticket, suggest relevant tags for a new ticket.\n\n\
         Resolved Ticket Description: {resolved_description}\n\n\
         New Ticket Description: {new_description}\n\n\
         Based on the resolved ticket, provide a few concise tags that would be \
         appropriate for the new ticket."
    )
}

/// Stable SHA-256 fingerprint keying in-flight requests.
fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use store::MemoryStore;
    use ticket_core::{Feedback, Ticket, TicketStatus};

    use super::*;
    use crate::mock::MockBackend;

    fn resolved_ticket() -> Ticket {
        let now = Utc::now();
        Ticket {
            id: "TKT-001".to_string(),
            subject: "Cannot reset my password".to_string(),
            description: "Password reset emails never arrive.".to_string(),
            status: TicketStatus::Resolved,
            category_id: "cat-1".to_string(),
            created_by: "user-1".to_string(),
            assigned_to: Some("agent-1".to_string()),
            created_at: now,
            last_modified: now,
            resolved_at: Some(now),
            feedback: Some(Feedback::Upvote),
            comments: Vec::new(),
        }
    }

    async fn store_with_exemplar() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.insert_ticket(&resolved_ticket()).await.unwrap();
        store
    }

    #[test]
    fn test_prompt_contains_both_descriptions() {
        let prompt = build_prompt("old issue", "new issue");
        assert!(prompt.contains("Resolved Ticket Description: old issue"));
        assert!(prompt.contains("New Ticket Description: new issue"));
    }

    #[test]
    fn test_fingerprint_stable() {
        assert_eq!(fingerprint("abc"), fingerprint("abc"));
        assert_ne!(fingerprint("abc"), fingerprint("abd"));
    }

    #[tokio::test]
    async fn test_suggest_happy_path() {
        let backend = Arc::new(MockBackend::with_tags(["login", "password"]));
        let suggester = TagSuggester::new(store_with_exemplar().await, backend.clone());

        let outcome = suggester.suggest("I cannot log in").await;
        assert!(outcome.success);
        assert_eq!(outcome.tags, vec!["login", "password"]);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_exemplar_skips_backend() {
        let backend = Arc::new(MockBackend::with_tags(["unused"]));
        let suggester = TagSuggester::new(Arc::new(MemoryStore::new()), backend.clone());

        let outcome = suggester.suggest("I cannot log in").await;
        assert!(!outcome.success);
        assert!(outcome.tags.is_empty());
        // The backend was never consulted.
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_degrades() {
        let backend = Arc::new(MockBackend::failing("timeout"));
        let suggester = TagSuggester::new(store_with_exemplar().await, backend);

        let outcome = suggester.suggest("I cannot log in").await;
        assert!(!outcome.success);
        assert!(outcome.tags.is_empty());
    }

    #[tokio::test]
    async fn test_empty_structured_output_degrades() {
        let backend = Arc::new(MockBackend::empty());
        let suggester = TagSuggester::new(store_with_exemplar().await, backend);

        let outcome = suggester.suggest("I cannot log in").await;
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn test_second_request_supersedes_first() {
        let backend =
            Arc::new(MockBackend::with_tags(["slow"]).with_delay(Duration::from_millis(100)));
        let suggester = Arc::new(TagSuggester::new(store_with_exemplar().await, backend));

        let first = {
            let suggester = suggester.clone();
            tokio::spawn(async move { suggester.suggest("dashboard is slow").await })
        };
        // Let the first request get in flight before issuing the second.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = suggester.suggest("dashboard is slow").await;

        let first = first.await.unwrap();
        assert!(!first.success, "superseded request must be discarded");
        assert!(second.success);
        assert_eq!(second.tags, vec!["slow"]);
    }

    #[tokio::test]
    async fn test_distinct_descriptions_do_not_interfere() {
        let backend = Arc::new(MockBackend::with_tags(["tag"]));
        let suggester = Arc::new(TagSuggester::new(store_with_exemplar().await, backend));

        let a = suggester.suggest("first issue").await;
        let b = suggester.suggest("second issue").await;
        assert!(a.success);
        assert!(b.success);
    }
}
