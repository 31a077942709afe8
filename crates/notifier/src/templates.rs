//! Email templates for workflow events.

use ticket_core::TicketEvent;

use crate::mailer::EmailPayload;

/// Render an event into an email. The recipient for TicketCreated is the
/// operations address; CommentAdded goes to the ticket's creator.
pub fn render(event: &TicketEvent, ops_address: &str) -> EmailPayload {
    match event {
        TicketEvent::TicketCreated {
            ticket,
            category_name,
        } => EmailPayload {
            to: ops_address.to_string(),
            subject: format!("[New Ticket] {}", ticket.subject),
            html_body: format!(
                "<h1>New Ticket Created</h1>\
                 <p>A new ticket has been submitted with the following details:</p>\
                 <ul>\
                 <li><b>Ticket:</b> {}</li>\
                 <li><b>Subject:</b> {}</li>\
                 <li><b>Category:</b> {}</li>\
                 </ul>\
                 <h3>Description:</h3>\
                 <p>{}</p>",
                ticket.id, ticket.subject, category_name, ticket.description
            ),
        },
        TicketEvent::CommentAdded {
            ticket_subject,
            creator_email,
            comment,
            ..
        } => EmailPayload {
            to: creator_email.clone(),
            subject: format!("New reply on ticket: {ticket_subject}"),
            html_body: format!(
                "<h1>New Reply from {}</h1>\
                 <p>A new reply has been added to your ticket \"{}\".</p>\
                 <p><b>Reply:</b> {}</p>",
                comment.author_name, ticket_subject, comment.content
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ticket_core::{Comment, Ticket, TicketStatus};

    use super::*;

    fn sample_ticket() -> Ticket {
        let now = Utc::now();
        Ticket {
            id: "TKT-001".to_string(),
            subject: "Cannot login".to_string(),
            description: "Password reset emails never arrive.".to_string(),
            status: TicketStatus::Open,
            category_id: "cat-1".to_string(),
            created_by: "user-1".to_string(),
            assigned_to: None,
            created_at: now,
            last_modified: now,
            resolved_at: None,
            feedback: None,
            comments: Vec::new(),
        }
    }

    #[test]
    fn test_ticket_created_template() {
        let event = TicketEvent::TicketCreated {
            ticket: sample_ticket(),
            category_name: "Technical Support".to_string(),
        };

        let email = render(&event, "ops@tickettrack.com");
        assert_eq!(email.to, "ops@tickettrack.com");
        assert_eq!(email.subject, "[New Ticket] Cannot login");
        assert!(email.html_body.contains("TKT-001"));
        assert!(email.html_body.contains("Technical Support"));
        assert!(email.html_body.contains("Password reset emails never arrive."));
    }

    #[test]
    fn test_comment_added_template() {
        let event = TicketEvent::CommentAdded {
            ticket_id: "TKT-001".to_string(),
            ticket_subject: "Cannot login".to_string(),
            creator_email: "alex.j@example.com".to_string(),
            comment: Comment {
                id: "comment-1".to_string(),
                ticket_id: "TKT-001".to_string(),
                author_id: "agent-1".to_string(),
                author_name: "Sam Wilson".to_string(),
                content: "I will trigger a reset link for you.".to_string(),
                created_at: Utc::now(),
            },
        };

        let email = render(&event, "ops@tickettrack.com");
        assert_eq!(email.to, "alex.j@example.com");
        assert_eq!(email.subject, "New reply on ticket: Cannot login");
        assert!(email.html_body.contains("New Reply from Sam Wilson"));
        assert!(email.html_body.contains("I will trigger a reset link for you."));
    }
}
