//! Ticket and comment operations.
//!
//! Comments belong to the ticket aggregate: tickets are always loaded with
//! their comments attached, and comments are only ever appended.

use async_trait::async_trait;
use sqlx::SqlitePool;
use ticket_core::store::TicketQuery;
use ticket_core::{Comment, StoreError, Ticket, TicketStatus, TicketStore};

use crate::rows::{encode_ts, CommentRow, TicketRow};
use crate::{backend_err, insert_err, SqliteStore};

const TICKET_COLUMNS: &str = "id, subject, description, status, category_id, created_by, \
     assigned_to, created_at, last_modified, resolved_at, feedback";

/// Insert a new ticket. Its comments, if any, are inserted alongside.
pub async fn create_ticket(pool: &SqlitePool, ticket: &Ticket) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO tickets (id, subject, description, status, category_id, created_by,
                             assigned_to, created_at, last_modified, resolved_at, feedback)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&ticket.id)
    .bind(&ticket.subject)
    .bind(&ticket.description)
    .bind(ticket.status.as_str())
    .bind(&ticket.category_id)
    .bind(&ticket.created_by)
    .bind(&ticket.assigned_to)
    .bind(encode_ts(&ticket.created_at))
    .bind(encode_ts(&ticket.last_modified))
    .bind(ticket.resolved_at.as_ref().map(encode_ts))
    .bind(ticket.feedback.map(|f| f.as_str()))
    .execute(pool)
    .await
    .map_err(|e| insert_err(e, "Ticket", &ticket.id))?;

    for comment in &ticket.comments {
        add_comment(pool, comment).await?;
    }

    Ok(())
}

/// Get a ticket by ID, comments included.
pub async fn get_ticket(pool: &SqlitePool, id: &str) -> Result<Ticket, StoreError> {
    let row = sqlx::query_as::<_, TicketRow>(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(backend_err)?
    .ok_or_else(|| StoreError::NotFound {
        entity: "Ticket",
        id: id.to_string(),
    })?;

    let comments = ticket_comments(pool, id).await?;
    row.into_ticket(comments)
}

/// List tickets matching the query, newest first.
pub async fn list_tickets(pool: &SqlitePool, query: &TicketQuery) -> Result<Vec<Ticket>, StoreError> {
    let rows = match (&query.created_by, &query.assigned_to) {
        (Some(creator), None) => {
            sqlx::query_as::<_, TicketRow>(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets WHERE created_by = ? ORDER BY created_at DESC"
            ))
            .bind(creator)
            .fetch_all(pool)
            .await
        }
        (None, Some(agent)) => {
            sqlx::query_as::<_, TicketRow>(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets WHERE assigned_to = ? ORDER BY created_at DESC"
            ))
            .bind(agent)
            .fetch_all(pool)
            .await
        }
        (Some(creator), Some(agent)) => {
            sqlx::query_as::<_, TicketRow>(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets \
                 WHERE created_by = ? AND assigned_to = ? ORDER BY created_at DESC"
            ))
            .bind(creator)
            .bind(agent)
            .fetch_all(pool)
            .await
        }
        (None, None) => {
            sqlx::query_as::<_, TicketRow>(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY created_at DESC"
            ))
            .fetch_all(pool)
            .await
        }
    }
    .map_err(backend_err)?;

    let mut tickets = Vec::with_capacity(rows.len());
    for row in rows {
        let comments = ticket_comments(pool, &row.id).await?;
        tickets.push(row.into_ticket(comments)?);
    }
    Ok(tickets)
}

/// Update scalar ticket fields. Comments are not touched.
pub async fn update_ticket(pool: &SqlitePool, ticket: &Ticket) -> Result<(), StoreError> {
    let result = sqlx::query(
        r#"
        UPDATE tickets
        SET subject = ?, description = ?, status = ?, category_id = ?,
            assigned_to = ?, last_modified = ?, resolved_at = ?, feedback = ?
        WHERE id = ?
        "#,
    )
    .bind(&ticket.subject)
    .bind(&ticket.description)
    .bind(ticket.status.as_str())
    .bind(&ticket.category_id)
    .bind(&ticket.assigned_to)
    .bind(encode_ts(&ticket.last_modified))
    .bind(ticket.resolved_at.as_ref().map(encode_ts))
    .bind(ticket.feedback.map(|f| f.as_str()))
    .bind(&ticket.id)
    .execute(pool)
    .await
    .map_err(backend_err)?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound {
            entity: "Ticket",
            id: ticket.id.clone(),
        });
    }

    Ok(())
}

/// Count all tickets. Drives the sequential ticket code.
pub async fn count_tickets(pool: &SqlitePool) -> Result<i64, StoreError> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets")
        .fetch_one(pool)
        .await
        .map_err(backend_err)
}

/// Append a comment to its parent ticket.
pub async fn add_comment(pool: &SqlitePool, comment: &Comment) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO comments (id, ticket_id, author_id, author_name, content, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&comment.id)
    .bind(&comment.ticket_id)
    .bind(&comment.author_id)
    .bind(&comment.author_name)
    .bind(&comment.content)
    .bind(encode_ts(&comment.created_at))
    .execute(pool)
    .await
    .map_err(|e| insert_err(e, "Comment", &comment.id))?;

    Ok(())
}

/// The first Resolved ticket carrying feedback, in id order.
pub async fn first_resolved_with_feedback(
    pool: &SqlitePool,
) -> Result<Option<Ticket>, StoreError> {
    let row = sqlx::query_as::<_, TicketRow>(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets \
         WHERE status = ? AND feedback IS NOT NULL ORDER BY id LIMIT 1"
    ))
    .bind(TicketStatus::Resolved.as_str())
    .fetch_optional(pool)
    .await
    .map_err(backend_err)?;

    match row {
        Some(row) => {
            let comments = ticket_comments(pool, &row.id).await?;
            Ok(Some(row.into_ticket(comments)?))
        }
        None => Ok(None),
    }
}

/// Count tickets filed under a category.
pub async fn count_tickets_in_category(
    pool: &SqlitePool,
    category_id: &str,
) -> Result<i64, StoreError> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets WHERE category_id = ?")
        .bind(category_id)
        .fetch_one(pool)
        .await
        .map_err(backend_err)
}

/// Comments for a ticket, oldest first.
async fn ticket_comments(pool: &SqlitePool, ticket_id: &str) -> Result<Vec<Comment>, StoreError> {
    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT id, ticket_id, author_id, author_name, content, created_at
        FROM comments
        WHERE ticket_id = ?
        ORDER BY created_at, id
        "#,
    )
    .bind(ticket_id)
    .fetch_all(pool)
    .await
    .map_err(backend_err)?;

    rows.into_iter().map(TryInto::try_into).collect()
}

#[async_trait]
impl TicketStore for SqliteStore {
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        create_ticket(self.pool(), ticket).await
    }

    async fn get_ticket(&self, id: &str) -> Result<Ticket, StoreError> {
        get_ticket(self.pool(), id).await
    }

    async fn list_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>, StoreError> {
        list_tickets(self.pool(), query).await
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        update_ticket(self.pool(), ticket).await
    }

    async fn count_tickets(&self) -> Result<i64, StoreError> {
        count_tickets(self.pool()).await
    }

    async fn append_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        add_comment(self.pool(), comment).await
    }

    async fn first_resolved_with_feedback(&self) -> Result<Option<Ticket>, StoreError> {
        first_resolved_with_feedback(self.pool()).await
    }

    async fn count_tickets_in_category(&self, category_id: &str) -> Result<i64, StoreError> {
        count_tickets_in_category(self.pool(), category_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use ticket_core::Feedback;

    fn sample_ticket(seq: i64, status: TicketStatus) -> Ticket {
        let now = Utc::now();
        Ticket {
            id: Ticket::format_id(seq),
            subject: format!("Ticket {seq}"),
            description: "Something is broken.".to_string(),
            status,
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

    #[tokio::test]
    async fn test_ticket_round_trip() {
        let store = crate::tests::test_store().await;
        let pool = store.pool();

        let mut ticket = sample_ticket(1, TicketStatus::Open);
        ticket.comments.push(Comment {
            id: "comment-1".to_string(),
            ticket_id: ticket.id.clone(),
            author_id: "agent-1".to_string(),
            author_name: "Sam Wilson".to_string(),
            content: "Looking into it.".to_string(),
            created_at: ticket.created_at,
        });

        create_ticket(pool, &ticket).await.unwrap();

        let fetched = get_ticket(pool, "TKT-001").await.unwrap();
        assert_eq!(fetched, ticket);
        assert_eq!(fetched.comments.len(), 1);
    }

    #[tokio::test]
    async fn test_list_tickets_filters() {
        let store = crate::tests::test_store().await;
        let pool = store.pool();

        let mut mine = sample_ticket(1, TicketStatus::Open);
        mine.created_at = Utc::now() - Duration::hours(1);
        mine.last_modified = mine.created_at;
        create_ticket(pool, &mine).await.unwrap();

        let mut other = sample_ticket(2, TicketStatus::Open);
        other.created_by = "user-2".to_string();
        other.assigned_to = Some("agent-1".to_string());
        create_ticket(pool, &other).await.unwrap();

        let all = list_tickets(pool, &TicketQuery::all()).await.unwrap();
        assert_eq!(all.len(), 2);
        // Newest first.
        assert_eq!(all[0].id, "TKT-002");

        let by_creator = list_tickets(pool, &TicketQuery::created_by("user-1"))
            .await
            .unwrap();
        assert_eq!(by_creator.len(), 1);
        assert_eq!(by_creator[0].id, "TKT-001");

        let by_agent = list_tickets(pool, &TicketQuery::assigned_to("agent-1"))
            .await
            .unwrap();
        assert_eq!(by_agent.len(), 1);
        assert_eq!(by_agent[0].id, "TKT-002");
    }

    #[tokio::test]
    async fn test_comments_ordered_and_append_only() {
        let store = crate::tests::test_store().await;
        let pool = store.pool();

        let ticket = sample_ticket(1, TicketStatus::Open);
        create_ticket(pool, &ticket).await.unwrap();

        let base = Utc::now();
        for i in 0..3 {
            add_comment(
                pool,
                &Comment {
                    id: format!("comment-{i}"),
                    ticket_id: ticket.id.clone(),
                    author_id: "user-1".to_string(),
                    author_name: "Alex Johnson".to_string(),
                    content: format!("reply {i}"),
                    created_at: base + Duration::seconds(i),
                },
            )
            .await
            .unwrap();
        }

        let fetched = get_ticket(pool, &ticket.id).await.unwrap();
        assert_eq!(fetched.comments.len(), 3);
        let contents: Vec<_> = fetched.comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["reply 0", "reply 1", "reply 2"]);
    }

    #[tokio::test]
    async fn test_first_resolved_with_feedback() {
        let store = crate::tests::test_store().await;
        let pool = store.pool();

        assert!(first_resolved_with_feedback(pool).await.unwrap().is_none());

        // Resolved but no feedback: not an exemplar.
        let mut resolved = sample_ticket(1, TicketStatus::Resolved);
        resolved.resolved_at = Some(Utc::now());
        create_ticket(pool, &resolved).await.unwrap();
        assert!(first_resolved_with_feedback(pool).await.unwrap().is_none());

        let mut upvoted = sample_ticket(2, TicketStatus::Resolved);
        upvoted.resolved_at = Some(Utc::now());
        upvoted.feedback = Some(Feedback::Upvote);
        create_ticket(pool, &upvoted).await.unwrap();

        let exemplar = first_resolved_with_feedback(pool).await.unwrap().unwrap();
        assert_eq!(exemplar.id, "TKT-002");
    }

    #[tokio::test]
    async fn test_count_tickets_in_category() {
        let store = crate::tests::test_store().await;
        let pool = store.pool();

        create_ticket(pool, &sample_ticket(1, TicketStatus::Open))
            .await
            .unwrap();
        let mut other = sample_ticket(2, TicketStatus::Open);
        other.category_id = "cat-2".to_string();
        create_ticket(pool, &other).await.unwrap();

        assert_eq!(count_tickets_in_category(pool, "cat-1").await.unwrap(), 1);
        assert_eq!(count_tickets_in_category(pool, "cat-9").await.unwrap(), 0);
    }
}
