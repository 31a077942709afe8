//! Demo seed data for development and demos.

use chrono::{TimeZone, Utc};
use ticket_core::{
    Category, CategoryStore, Comment, EntityStore, Feedback, Role, StoreError, Ticket,
    TicketStatus, TicketStore, User, UserStore,
};

fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .unwrap_or(chrono::DateTime::UNIX_EPOCH)
}

/// Demo user accounts: two end users, two agents, one admin.
pub fn demo_users() -> Vec<User> {
    vec![
        User {
            id: "user-1".to_string(),
            name: "Alex Johnson".to_string(),
            email: "alex.j@example.com".to_string(),
            avatar: "/avatars/01.png".to_string(),
            role: Role::User,
            registration_date: ts(2024, 4, 1, 10, 0),
            last_login: ts(2024, 5, 25, 14, 20),
        },
        User {
            id: "user-2".to_string(),
            name: "Maria Garcia".to_string(),
            email: "maria.g@example.com".to_string(),
            avatar: "/avatars/02.png".to_string(),
            role: Role::User,
            registration_date: ts(2024, 3, 15, 8, 30),
            last_login: ts(2024, 5, 24, 9, 15),
        },
        User {
            id: "agent-1".to_string(),
            name: "Sam Wilson".to_string(),
            email: "sam.w@support.com".to_string(),
            avatar: "/avatars/agent-1.png".to_string(),
            role: Role::Agent,
            registration_date: ts(2024, 2, 1, 9, 0),
            last_login: ts(2024, 5, 25, 15, 0),
        },
        User {
            id: "agent-2".to_string(),
            name: "Jessica Chen".to_string(),
            email: "jessica.c@support.com".to_string(),
            avatar: "/avatars/agent-2.png".to_string(),
            role: Role::Agent,
            registration_date: ts(2024, 2, 5, 11, 0),
            last_login: ts(2024, 5, 24, 12, 0),
        },
        User {
            id: "admin-1".to_string(),
            name: "Admin User".to_string(),
            email: "admin@tickettrack.com".to_string(),
            avatar: "/avatars/admin-1.png".to_string(),
            role: Role::Admin,
            registration_date: ts(2024, 1, 1, 0, 0),
            last_login: ts(2024, 5, 25, 18, 0),
        },
    ]
}

/// The default category set.
pub fn demo_categories() -> Vec<Category> {
    vec![
        Category {
            id: "cat-1".to_string(),
            name: "Technical Support".to_string(),
            description: "Issues related to software, hardware, and system errors.".to_string(),
        },
        Category {
            id: "cat-2".to_string(),
            name: "Billing".to_string(),
            description: "Questions about invoices, payments, and subscriptions.".to_string(),
        },
        Category {
            id: "cat-3".to_string(),
            name: "General Inquiry".to_string(),
            description: "Non-technical questions about our services or company.".to_string(),
        },
        Category {
            id: "cat-4".to_string(),
            name: "Bug Report".to_string(),
            description: "Reporting functional problems or glitches in the application."
                .to_string(),
        },
    ]
}

/// Demo tickets, including a Resolved upvoted ticket that serves as the
/// tag-suggestion exemplar.
pub fn demo_tickets() -> Vec<Ticket> {
    vec![
        Ticket {
            id: "TKT-001".to_string(),
            subject: "Cannot reset my password".to_string(),
            description: "I've been trying to reset my password using the 'Forgot Password' \
                link, but I'm not receiving the reset email. I've checked my spam folder and \
                it's not there. Can you please assist?"
                .to_string(),
            status: TicketStatus::Resolved,
            category_id: "cat-1".to_string(),
            created_by: "user-1".to_string(),
            assigned_to: Some("agent-1".to_string()),
            created_at: ts(2024, 5, 20, 10, 0),
            last_modified: ts(2024, 5, 23, 14, 30),
            resolved_at: Some(ts(2024, 5, 23, 14, 30)),
            feedback: Some(Feedback::Upvote),
            comments: vec![
                Comment {
                    id: "comment-1".to_string(),
                    ticket_id: "TKT-001".to_string(),
                    author_id: "agent-1".to_string(),
                    author_name: "Sam Wilson".to_string(),
                    content: "Hi Alex, I will look into this for you. I will manually trigger \
                        a password reset link to your email."
                        .to_string(),
                    created_at: ts(2024, 5, 20, 11, 0),
                },
                Comment {
                    id: "comment-2".to_string(),
                    ticket_id: "TKT-001".to_string(),
                    author_id: "user-1".to_string(),
                    author_name: "Alex Johnson".to_string(),
                    content: "Thank you, Sam! I received it and was able to reset my password."
                        .to_string(),
                    created_at: ts(2024, 5, 20, 11, 30),
                },
            ],
        },
        Ticket {
            id: "TKT-002".to_string(),
            subject: "Billing question about my last invoice".to_string(),
            description: "My invoice #INV-123 seems to have an incorrect charge. It lists a \
                \"Service Fee\" that I was not aware of. Could you clarify what this is for?"
                .to_string(),
            status: TicketStatus::InProgress,
            category_id: "cat-2".to_string(),
            created_by: "user-2".to_string(),
            assigned_to: Some("agent-2".to_string()),
            created_at: ts(2024, 5, 22, 9, 15),
            last_modified: ts(2024, 5, 24, 11, 0),
            resolved_at: None,
            feedback: None,
            comments: vec![Comment {
                id: "comment-3".to_string(),
                ticket_id: "TKT-002".to_string(),
                author_id: "agent-2".to_string(),
                author_name: "Jessica Chen".to_string(),
                content: "Hi Maria, I'm checking with our billing department regarding the \
                    service fee on your invoice. I'll get back to you shortly."
                    .to_string(),
                created_at: ts(2024, 5, 22, 9, 45),
            }],
        },
        Ticket {
            id: "TKT-003".to_string(),
            subject: "Feature request: Dark mode".to_string(),
            description: "The application is great, but a dark mode option would be much \
                easier on the eyes, especially when working at night. Please consider adding \
                this feature."
                .to_string(),
            status: TicketStatus::Open,
            category_id: "cat-3".to_string(),
            created_by: "user-1".to_string(),
            assigned_to: None,
            created_at: ts(2024, 5, 24, 16, 0),
            last_modified: ts(2024, 5, 24, 16, 0),
            resolved_at: None,
            feedback: None,
            comments: Vec::new(),
        },
        Ticket {
            id: "TKT-004".to_string(),
            subject: "Website is loading very slowly".to_string(),
            description: "For the past few hours, the main dashboard has been extremely slow \
                to load. All other websites are working fine on my connection. It's making it \
                difficult to check my ticket statuses."
                .to_string(),
            status: TicketStatus::Open,
            category_id: "cat-1".to_string(),
            created_by: "user-2".to_string(),
            assigned_to: None,
            created_at: ts(2024, 5, 25, 11, 0),
            last_modified: ts(2024, 5, 25, 11, 0),
            resolved_at: None,
            feedback: None,
            comments: Vec::new(),
        },
    ]
}

/// Seed a store with the demo data set. Skips nothing; intended for a fresh
/// store.
pub async fn seed_demo_data<S: EntityStore + ?Sized>(store: &S) -> Result<(), StoreError> {
    for category in demo_categories() {
        store.insert_category(&category).await?;
    }
    for user in demo_users() {
        store.insert_user(&user).await?;
    }
    for ticket in demo_tickets() {
        store.insert_ticket(&ticket).await?;
    }

    tracing::info!("Seeded demo data: 5 users, 4 categories, 4 tickets");
    Ok(())
}
