//! Event dispatcher: consumes workflow events and attempts delivery.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use ticket_core::{DeliveryReport, EventSink, TicketEvent};

use crate::mailer::{Mailer, NoOpMailer};
use crate::templates;

/// Default operations address notified about new tickets.
pub const DEFAULT_OPS_ADDRESS: &str = "support-ops@tickettrack.com";

/// Translates workflow events into outbound email, best-effort.
///
/// A failed delivery is logged and reported through the returned
/// [`DeliveryReport`]; it never surfaces as an error to the workflow
/// operation that published the event.
pub struct Dispatcher {
    mailer: Arc<dyn Mailer>,
    ops_address: String,
}

impl Dispatcher {
    /// Create a dispatcher over the given mail transport.
    pub fn new(mailer: Arc<dyn Mailer>, ops_address: impl Into<String>) -> Self {
        Self {
            mailer,
            ops_address: ops_address.into(),
        }
    }

    /// Create a dispatcher from environment variables.
    ///
    /// Uses [`crate::HttpMailer`] when `MAIL_API_URL` and `MAIL_API_KEY` are
    /// set; otherwise warns once and falls back to a no-op transport so the
    /// rest of the system keeps working without mail credentials.
    ///
    /// Optional: `MAIL_OPS_ADDRESS` overrides the operations address.
    pub fn from_env() -> Self {
        let ops_address = std::env::var("MAIL_OPS_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_OPS_ADDRESS.to_string());

        match crate::HttpMailer::from_env() {
            Ok(mailer) => Self::new(Arc::new(mailer), ops_address),
            Err(e) => {
                warn!("Mail credentials not found ({e}); notifications will be skipped");
                Self::new(Arc::new(NoOpMailer), ops_address)
            }
        }
    }

    /// The operations address new-ticket notifications go to.
    pub fn ops_address(&self) -> &str {
        &self.ops_address
    }
}

#[async_trait]
impl EventSink for Dispatcher {
    async fn publish(&self, event: &TicketEvent) -> DeliveryReport {
        let email = templates::render(event, &self.ops_address);

        match self.mailer.send(&email).await {
            Ok(()) => {
                debug!("Notification delivered to {}", email.to);
                DeliveryReport::delivered()
            }
            Err(e) => {
                warn!("Notification to {} failed: {}", email.to, e);
                DeliveryReport::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ticket_core::{Comment, TicketEvent};

    use super::*;
    use crate::mailer::RecordingMailer;

    fn comment_event() -> TicketEvent {
        TicketEvent::CommentAdded {
            ticket_id: "TKT-002".to_string(),
            ticket_subject: "Billing question".to_string(),
            creator_email: "maria.g@example.com".to_string(),
            comment: Comment {
                id: "comment-1".to_string(),
                ticket_id: "TKT-002".to_string(),
                author_id: "agent-2".to_string(),
                author_name: "Jessica Chen".to_string(),
                content: "Checking with billing.".to_string(),
                created_at: Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let mailer = Arc::new(RecordingMailer::new());
        let dispatcher = Dispatcher::new(mailer.clone(), DEFAULT_OPS_ADDRESS);

        let report = dispatcher.publish(&comment_event()).await;
        assert!(report.delivered);

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "maria.g@example.com");
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_reported_not_raised() {
        let mailer = Arc::new(RecordingMailer::failing("SMTP bridge down"));
        let dispatcher = Dispatcher::new(mailer.clone(), DEFAULT_OPS_ADDRESS);

        let report = dispatcher.publish(&comment_event()).await;
        assert!(!report.delivered);
        assert!(report.error.as_deref().unwrap().contains("SMTP bridge down"));

        // Exactly one attempt was made.
        assert_eq!(mailer.sent().await.len(), 1);
    }
}
