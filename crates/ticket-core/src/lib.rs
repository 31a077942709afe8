//! Core domain types and traits for TicketTrack.
//!
//! This crate provides the shared vocabulary for the helpdesk workflow:
//!
//! - [`Ticket`] / [`Comment`] / [`User`] / [`Category`] - the entities
//! - [`TicketStatus`] - the lifecycle state machine with its transition table
//! - [`UserStore`] / [`TicketStore`] / [`CategoryStore`] - repository traits
//!   any persistent store can implement
//! - [`TicketEvent`] / [`EventSink`] - domain events emitted by workflow
//!   operations and consumed by the notification dispatcher
//!
//! # Example
//!
//! ```rust
//! use ticket_core::TicketStatus;
//!
//! assert!(TicketStatus::Open.can_transition_to(TicketStatus::InProgress));
//! assert!(!TicketStatus::Closed.can_transition_to(TicketStatus::Open));
//! ```

pub mod events;
pub mod models;
pub mod store;
pub mod validation;

pub use events::{DeliveryReport, EventSink, NullSink, TicketEvent};
pub use models::{Category, Comment, Feedback, Role, Ticket, TicketStatus, User};
pub use store::{CategoryStore, EntityStore, StoreError, TicketStore, UserStore};
pub use validation::ValidationError;

// Re-export async_trait for implementors of the store and sink traits.
pub use async_trait::async_trait;
