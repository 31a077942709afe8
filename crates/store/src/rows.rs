//! Row types and column decoding for the SQLite store.
//!
//! Enums and timestamps are stored as TEXT; decoding failures surface as
//! backend errors rather than panics.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use ticket_core::{Category, Comment, Feedback, StoreError, Ticket, TicketStatus, User};

/// Encode a timestamp for storage.
pub(crate) fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Decode a stored timestamp.
pub(crate) fn decode_ts(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Backend(format!("invalid timestamp '{raw}': {e}")))
}

fn decode_enum<T: std::str::FromStr<Err = String>>(raw: &str) -> Result<T, StoreError> {
    raw.parse().map_err(StoreError::Backend)
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub role: String,
    pub registration_date: String,
    pub last_login: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            role: decode_enum(&row.role)?,
            registration_date: decode_ts(&row.registration_date)?,
            last_login: decode_ts(&row.last_login)?,
            id: row.id,
            name: row.name,
            email: row.email,
            avatar: row.avatar,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CategoryRow {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct TicketRow {
    pub id: String,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub category_id: String,
    pub created_by: String,
    pub assigned_to: Option<String>,
    pub created_at: String,
    pub last_modified: String,
    pub resolved_at: Option<String>,
    pub feedback: Option<String>,
}

impl TicketRow {
    /// Assemble a domain ticket from the row plus its comments.
    pub(crate) fn into_ticket(self, comments: Vec<Comment>) -> Result<Ticket, StoreError> {
        Ok(Ticket {
            status: decode_enum::<TicketStatus>(&self.status)?,
            created_at: decode_ts(&self.created_at)?,
            last_modified: decode_ts(&self.last_modified)?,
            resolved_at: self.resolved_at.as_deref().map(decode_ts).transpose()?,
            feedback: self
                .feedback
                .as_deref()
                .map(decode_enum::<Feedback>)
                .transpose()?,
            id: self.id,
            subject: self.subject,
            description: self.description,
            category_id: self.category_id,
            created_by: self.created_by,
            assigned_to: self.assigned_to,
            comments,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CommentRow {
    pub id: String,
    pub ticket_id: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub created_at: String,
}

impl TryFrom<CommentRow> for Comment {
    type Error = StoreError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(Comment {
            created_at: decode_ts(&row.created_at)?,
            id: row.id,
            ticket_id: row.ticket_id,
            author_id: row.author_id,
            author_name: row.author_name,
            content: row.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_round_trip() {
        let now = Utc::now();
        let decoded = decode_ts(&encode_ts(&now)).unwrap();
        assert_eq!(decoded, now);
    }

    #[test]
    fn test_decode_ts_rejects_garbage() {
        assert!(matches!(
            decode_ts("not-a-timestamp"),
            Err(StoreError::Backend(_))
        ));
    }
}
