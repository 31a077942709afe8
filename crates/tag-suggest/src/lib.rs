//! Tag suggestion for new tickets.
//!
//! A thin adapter around a text-generation backend: one historical resolved
//! ticket with feedback serves as in-context guidance, the new ticket's
//! description is appended, and the backend returns a structured list of
//! tags. The adapter is stateless apart from in-flight request tracking and
//! degrades to "no suggestions" on any failure.
//!
//! # Example
//!
//! ```rust,ignore
//! use tag_suggest::{MockBackend, TagSuggester};
//!
//! let suggester = TagSuggester::new(store, Arc::new(MockBackend::with_tags(["login"])));
//! let outcome = suggester.suggest("I cannot log in to my account").await;
//! assert!(outcome.success);
//! ```

mod api_types;
mod backend;
mod chat;
mod config;
mod mock;
mod suggester;

pub use backend::{DisabledBackend, GenerationBackend, SuggestError};
pub use chat::ChatCompletionsBackend;
pub use config::SuggestConfig;
pub use mock::MockBackend;
pub use suggester::{SuggestionOutcome, TagSuggester};
