//! The ticket workflow service.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use ticket_core::store::TicketQuery;
use ticket_core::{
    validation, Comment, DeliveryReport, EntityStore, EventSink, Feedback, StoreError, Ticket,
    TicketEvent, TicketStatus, ValidationError,
};

use crate::error::WorkflowError;

/// Input for [`TicketService::create_ticket`].
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
    pub category_id: String,
    pub creator_id: String,
}

/// Result of creating a ticket: the ticket plus the outcome of the
/// best-effort notification to the operations address.
#[derive(Debug, Clone)]
pub struct CreateTicketOutcome {
    pub ticket: Ticket,
    pub notification: DeliveryReport,
}

/// Result of adding a comment.
#[derive(Debug, Clone)]
pub struct AddCommentOutcome {
    pub comment: Comment,
    /// Ticket status after the reply (may have auto-transitioned).
    pub status: TicketStatus,
    /// Delivery outcome for the creator notification. None when the creator
    /// replied to their own ticket, or no longer exists.
    pub notification: Option<DeliveryReport>,
}

/// Coordinates every workflow mutation against the injected entity store and
/// publishes domain events to the injected sink.
pub struct TicketService {
    store: Arc<dyn EntityStore>,
    events: Arc<dyn EventSink>,
}

impl TicketService {
    /// Create a new service over a store and an event sink.
    pub fn new(store: Arc<dyn EntityStore>, events: Arc<dyn EventSink>) -> Self {
        Self { store, events }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// File a new ticket. The ticket starts Open with no comments and gets
    /// the next sequential `TKT-` code.
    pub async fn create_ticket(
        &self,
        input: NewTicket,
    ) -> Result<CreateTicketOutcome, WorkflowError> {
        validation::validate_subject(&input.subject)?;
        validation::validate_description(&input.description)?;

        // An unknown category is a validation failure, not a missing entity:
        // the category id comes straight from the ticket form.
        let category = match self.store.get_category(&input.category_id).await {
            Ok(category) => category,
            Err(StoreError::NotFound { .. }) => {
                return Err(ValidationError::UnknownCategory(input.category_id).into());
            }
            Err(e) => return Err(e.into()),
        };

        let creator = self.store.get_user(&input.creator_id).await?;

        let seq = self.store.count_tickets().await? + 1;
        let now = Utc::now();
        let ticket = Ticket {
            id: Ticket::format_id(seq),
            subject: input.subject.trim().to_string(),
            description: input.description.trim().to_string(),
            status: TicketStatus::Open,
            category_id: category.id.clone(),
            created_by: creator.id.clone(),
            assigned_to: None,
            created_at: now,
            last_modified: now,
            resolved_at: None,
            feedback: None,
            comments: Vec::new(),
        };

        self.store.insert_ticket(&ticket).await?;
        info!("Created ticket {} ({})", ticket.id, category.name);

        let notification = self
            .events
            .publish(&TicketEvent::TicketCreated {
                ticket: ticket.clone(),
                category_name: category.name,
            })
            .await;

        Ok(CreateTicketOutcome {
            ticket,
            notification,
        })
    }

    /// Append a reply to a ticket.
    ///
    /// The first agent reply on an Open ticket auto-transitions it to
    /// In Progress; replying again does not re-trigger the transition. The
    /// ticket's creator is notified unless they authored the reply.
    pub async fn add_comment(
        &self,
        ticket_id: &str,
        author_id: &str,
        content: &str,
    ) -> Result<AddCommentOutcome, WorkflowError> {
        validation::validate_comment(content)?;

        let mut ticket = self.store.get_ticket(ticket_id).await?;
        let author = self.store.get_user(author_id).await?;

        let now = Utc::now();
        let comment = Comment {
            id: format!("comment-{}", Uuid::new_v4()),
            ticket_id: ticket.id.clone(),
            author_id: author.id.clone(),
            author_name: author.name.clone(),
            content: content.trim().to_string(),
            created_at: now,
        };

        self.store.append_comment(&comment).await?;

        ticket.last_modified = now;
        if author.role == ticket_core::Role::Agent && ticket.status == TicketStatus::Open {
            ticket.status = TicketStatus::InProgress;
            debug!("Ticket {} auto-transitioned to In Progress", ticket.id);
        }
        self.store.update_ticket(&ticket).await?;

        // Notify the creator, unless they wrote the reply themselves or the
        // account has since been deleted.
        let notification = if ticket.created_by == author.id {
            None
        } else {
            match self.store.get_user(&ticket.created_by).await {
                Ok(creator) => Some(
                    self.events
                        .publish(&TicketEvent::CommentAdded {
                            ticket_id: ticket.id.clone(),
                            ticket_subject: ticket.subject.clone(),
                            creator_email: creator.email,
                            comment: comment.clone(),
                        })
                        .await,
                ),
                Err(StoreError::NotFound { .. }) => None,
                Err(e) => return Err(e.into()),
            }
        };

        Ok(AddCommentOutcome {
            comment,
            status: ticket.status,
            notification,
        })
    }

    /// Assign a ticket to an agent. Status is not changed.
    pub async fn assign_ticket(
        &self,
        ticket_id: &str,
        agent_id: &str,
    ) -> Result<Ticket, WorkflowError> {
        let mut ticket = self.store.get_ticket(ticket_id).await?;
        let agent = self.store.get_user(agent_id).await?;

        if agent.role != ticket_core::Role::Agent {
            return Err(WorkflowError::InvalidRole {
                user_id: agent.id,
                required: ticket_core::Role::Agent,
                actual: agent.role,
            });
        }

        ticket.assigned_to = Some(agent.id.clone());
        ticket.last_modified = Utc::now();
        self.store.update_ticket(&ticket).await?;

        info!("Assigned ticket {} to {}", ticket.id, agent.id);
        Ok(ticket)
    }

    /// Manually transition a ticket's status.
    ///
    /// Only staff may transition. The transition table is forward-only:
    /// attempts to stay put, move backward, or leave Closed are rejected.
    pub async fn transition_status(
        &self,
        ticket_id: &str,
        actor_id: &str,
        next: TicketStatus,
    ) -> Result<Ticket, WorkflowError> {
        let actor = self.store.get_user(actor_id).await?;
        if !actor.role.is_staff() {
            return Err(WorkflowError::InvalidRole {
                user_id: actor.id,
                required: ticket_core::Role::Agent,
                actual: actor.role,
            });
        }

        let mut ticket = self.store.get_ticket(ticket_id).await?;
        if !ticket.status.can_transition_to(next) {
            return Err(WorkflowError::InvalidState(format!(
                "ticket {} cannot move from {} to {}",
                ticket.id, ticket.status, next
            )));
        }

        ticket.status = next;
        ticket.last_modified = Utc::now();
        if next == TicketStatus::Resolved && ticket.resolved_at.is_none() {
            ticket.resolved_at = Some(ticket.last_modified);
        }
        self.store.update_ticket(&ticket).await?;

        info!("Ticket {} transitioned to {}", ticket.id, next);
        Ok(ticket)
    }

    /// Set or toggle resolution feedback.
    ///
    /// Only valid while the ticket is Resolved. Submitting the value already
    /// present clears it; submitting the other value replaces it.
    pub async fn set_feedback(
        &self,
        ticket_id: &str,
        value: Feedback,
    ) -> Result<Ticket, WorkflowError> {
        let mut ticket = self.store.get_ticket(ticket_id).await?;

        if ticket.status != TicketStatus::Resolved {
            return Err(WorkflowError::InvalidState(format!(
                "feedback requires a Resolved ticket, {} is {}",
                ticket.id, ticket.status
            )));
        }

        ticket.feedback = if ticket.feedback == Some(value) {
            None
        } else {
            Some(value)
        };
        ticket.last_modified = Utc::now();
        self.store.update_ticket(&ticket).await?;

        Ok(ticket)
    }

    /// Fetch a ticket with its comments.
    pub async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket, WorkflowError> {
        Ok(self.store.get_ticket(ticket_id).await?)
    }

    /// List tickets matching the query, newest first.
    pub async fn list_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>, WorkflowError> {
        Ok(self.store.list_tickets(query).await?)
    }
}
