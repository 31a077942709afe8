//! Domain events emitted by workflow operations.
//!
//! Workflow operations mutate the store first, then publish an event. The
//! sink's outcome is reported back to the caller for observability but never
//! rolls back the mutation that already happened.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{Comment, Ticket};

/// A workflow event worth notifying someone about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketEvent {
    /// A new ticket was filed.
    TicketCreated {
        ticket: Ticket,
        /// Name of the category the ticket was filed under.
        category_name: String,
    },
    /// A reply was added to an existing ticket.
    CommentAdded {
        ticket_id: String,
        ticket_subject: String,
        /// Email address of the ticket's creator.
        creator_email: String,
        comment: Comment,
    },
}

/// Outcome of a best-effort dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Whether the message was handed to the transport.
    pub delivered: bool,
    /// Transport error, when delivery failed.
    pub error: Option<String>,
}

impl DeliveryReport {
    /// A successful delivery.
    pub fn delivered() -> Self {
        Self {
            delivered: true,
            error: None,
        }
    }

    /// A failed delivery with the transport's error message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            delivered: false,
            error: Some(error.into()),
        }
    }
}

/// Consumer of domain events.
///
/// Implementations must be best-effort: they report failure through the
/// returned [`DeliveryReport`], never through a panic or an error that could
/// abort the workflow operation that published the event.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: &TicketEvent) -> DeliveryReport;
}

/// A sink that drops every event and reports success. Used when no mail
/// transport is configured.
#[derive(Debug, Clone, Default)]
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn publish(&self, _event: &TicketEvent) -> DeliveryReport {
        DeliveryReport::delivered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_report_constructors() {
        let ok = DeliveryReport::delivered();
        assert!(ok.delivered);
        assert!(ok.error.is_none());

        let failed = DeliveryReport::failed("connection refused");
        assert!(!failed.delivered);
        assert_eq!(failed.error.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_null_sink_reports_success() {
        let sink = NullSink;
        let event = TicketEvent::CommentAdded {
            ticket_id: "TKT-001".to_string(),
            ticket_subject: "Cannot login".to_string(),
            creator_email: "alex.j@example.com".to_string(),
            comment: crate::models::Comment {
                id: "comment-1".to_string(),
                ticket_id: "TKT-001".to_string(),
                author_id: "agent-1".to_string(),
                author_name: "Sam Wilson".to_string(),
                content: "On it.".to_string(),
                created_at: chrono::Utc::now(),
            },
        };

        let report = sink.publish(&event).await;
        assert!(report.delivered);
    }
}
