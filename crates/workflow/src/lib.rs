//! Ticket workflow rules for TicketTrack.
//!
//! This crate provides the [`TicketService`] type which coordinates every
//! state mutation in the system: ticket creation, replies, assignment,
//! status transitions, feedback, and the admin surfaces for categories and
//! users.
//!
//! Every operation runs to completion against the injected entity store
//! before returning. Notification dispatch happens after the mutation is
//! applied and is best-effort: its outcome is reported back to the caller
//! but can never roll the mutation back.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use workflow::{NewTicket, TicketService};
//!
//! let service = TicketService::new(store, sink);
//! let outcome = service
//!     .create_ticket(NewTicket {
//!         subject: "Cannot login".into(),
//!         description: "Password reset emails never arrive.".into(),
//!         category_id: "cat-1".into(),
//!         creator_id: "user-1".into(),
//!     })
//!     .await?;
//!
//! assert_eq!(outcome.ticket.status, ticket_core::TicketStatus::Open);
//! ```

mod admin;
mod error;
mod service;

pub use error::WorkflowError;
pub use service::{AddCommentOutcome, CreateTicketOutcome, NewTicket, TicketService};

// Re-export the query type callers need for listings.
pub use ticket_core::store::TicketQuery;
