//! Repository traits for the entity store.
//!
//! Workflow logic only sees these traits; any store satisfying the CRUD
//! access patterns (in-memory, SQLite, or otherwise) can be injected.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Category, Comment, Ticket, User};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists.
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Underlying backend failure (connection, query, decode).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Filter for ticket listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
    /// Only tickets created by this user.
    pub created_by: Option<String>,
    /// Only tickets assigned to this agent.
    pub assigned_to: Option<String>,
}

impl TicketQuery {
    /// All tickets, newest first.
    pub fn all() -> Self {
        Self::default()
    }

    /// Tickets created by the given user.
    pub fn created_by(user_id: impl Into<String>) -> Self {
        Self {
            created_by: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// Tickets assigned to the given agent.
    pub fn assigned_to(agent_id: impl Into<String>) -> Self {
        Self {
            assigned_to: Some(agent_id.into()),
            ..Self::default()
        }
    }
}

/// User repository.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn get_user(&self, id: &str) -> Result<User>;
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn update_user(&self, user: &User) -> Result<()>;
    async fn delete_user(&self, id: &str) -> Result<()>;
}

/// Ticket repository. Owns comments as part of the ticket aggregate.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<()>;
    async fn get_ticket(&self, id: &str) -> Result<Ticket>;
    /// Tickets matching the query, newest first, comments included.
    async fn list_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>>;
    /// Update scalar ticket fields. Comments are appended separately.
    async fn update_ticket(&self, ticket: &Ticket) -> Result<()>;
    /// Total tickets ever inserted; drives the sequential id code.
    async fn count_tickets(&self) -> Result<i64>;
    /// Append a comment to its parent ticket.
    async fn append_comment(&self, comment: &Comment) -> Result<()>;
    /// The exemplar for tag suggestion: first Resolved ticket carrying
    /// feedback, in id order. None when no such ticket exists.
    async fn first_resolved_with_feedback(&self) -> Result<Option<Ticket>>;
    /// Number of tickets filed under a category. Guards category deletion.
    async fn count_tickets_in_category(&self, category_id: &str) -> Result<i64>;
}

/// Category repository.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn insert_category(&self, category: &Category) -> Result<()>;
    async fn get_category(&self, id: &str) -> Result<Category>;
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn update_category(&self, category: &Category) -> Result<()>;
    async fn delete_category(&self, id: &str) -> Result<()>;
}

/// Combined store surface the workflow service is injected with.
pub trait EntityStore: UserStore + TicketStore + CategoryStore {}

impl<S: UserStore + TicketStore + CategoryStore> EntityStore for S {}
