//! In-memory entity store.
//!
//! Single-writer, last-write-wins: one mutex over plain maps, no
//! persistence. Used as the default store when no database is configured,
//! and as a lightweight store for tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ticket_core::store::TicketQuery;
use ticket_core::{
    Category, CategoryStore, Comment, StoreError, Ticket, TicketStatus, TicketStore, User,
    UserStore,
};

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<String, User>,
    tickets: BTreeMap<String, Ticket>,
    categories: BTreeMap<String, Category>,
    tickets_created: i64,
}

/// Mutex-guarded in-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(entity: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        entity,
        id: id.to_string(),
    }
}

fn already_exists(entity: &'static str, id: &str) -> StoreError {
    StoreError::AlreadyExists {
        entity,
        id: id.to_string(),
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.users.contains_key(&user.id)
            || inner.users.values().any(|u| u.email == user.email)
        {
            return Err(already_exists("User", &user.id));
        }
        inner.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        let inner = self.inner.lock().await;
        inner.users.get(id).cloned().ok_or_else(|| not_found("User", id))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.lock().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.users.contains_key(&user.id) {
            return Err(not_found("User", &user.id));
        }
        inner.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.users.remove(id).map(|_| ()).ok_or_else(|| not_found("User", id))
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.tickets.contains_key(&ticket.id) {
            return Err(already_exists("Ticket", &ticket.id));
        }
        inner.tickets.insert(ticket.id.clone(), ticket.clone());
        inner.tickets_created += 1;
        Ok(())
    }

    async fn get_ticket(&self, id: &str) -> Result<Ticket, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .tickets
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("Ticket", id))
    }

    async fn list_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>, StoreError> {
        let inner = self.inner.lock().await;
        let mut tickets: Vec<Ticket> = inner
            .tickets
            .values()
            .filter(|t| {
                query
                    .created_by
                    .as_ref()
                    .is_none_or(|creator| &t.created_by == creator)
                    && query
                        .assigned_to
                        .as_ref()
                        .is_none_or(|agent| t.assigned_to.as_ref() == Some(agent))
            })
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let existing = inner
            .tickets
            .get_mut(&ticket.id)
            .ok_or_else(|| not_found("Ticket", &ticket.id))?;
        // Comments are owned by append_comment; keep the stored list.
        let comments = std::mem::take(&mut existing.comments);
        *existing = Ticket {
            comments,
            ..ticket.clone()
        };
        Ok(())
    }

    async fn count_tickets(&self) -> Result<i64, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.tickets_created)
    }

    async fn append_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let ticket = inner
            .tickets
            .get_mut(&comment.ticket_id)
            .ok_or_else(|| not_found("Ticket", &comment.ticket_id))?;
        ticket.comments.push(comment.clone());
        Ok(())
    }

    async fn first_resolved_with_feedback(&self) -> Result<Option<Ticket>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .values()
            .find(|t| t.status == TicketStatus::Resolved && t.feedback.is_some())
            .cloned())
    }

    async fn count_tickets_in_category(&self, category_id: &str) -> Result<i64, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .values()
            .filter(|t| t.category_id == category_id)
            .count() as i64)
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn insert_category(&self, category: &Category) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.categories.contains_key(&category.id)
            || inner.categories.values().any(|c| c.name == category.name)
        {
            return Err(already_exists("Category", &category.id));
        }
        inner.categories.insert(category.id.clone(), category.clone());
        Ok(())
    }

    async fn get_category(&self, id: &str) -> Result<Category, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .categories
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("Category", id))
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.categories.values().find(|c| c.name == name).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.categories.values().cloned().collect())
    }

    async fn update_category(&self, category: &Category) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.categories.contains_key(&category.id) {
            return Err(not_found("Category", &category.id));
        }
        inner.categories.insert(category.id.clone(), category.clone());
        Ok(())
    }

    async fn delete_category(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .categories
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("Category", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use ticket_core::Role;

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{id}@example.com"),
            avatar: String::new(),
            role,
            registration_date: Utc::now(),
            last_login: Utc::now(),
        }
    }

    fn ticket(seq: i64) -> Ticket {
        let now = Utc::now();
        Ticket {
            id: Ticket::format_id(seq),
            subject: format!("Ticket {seq}"),
            description: "desc".to_string(),
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

    #[tokio::test]
    async fn test_user_crud() {
        let store = MemoryStore::new();

        store.insert_user(&user("user-1", Role::User)).await.unwrap();
        assert!(matches!(
            store.insert_user(&user("user-1", Role::User)).await,
            Err(StoreError::AlreadyExists { .. })
        ));

        let fetched = store.get_user("user-1").await.unwrap();
        assert_eq!(fetched.role, Role::User);

        store.delete_user("user-1").await.unwrap();
        assert!(matches!(
            store.get_user("user-1").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_ticket_ordering_newest_first() {
        let store = MemoryStore::new();

        let mut first = ticket(1);
        first.created_at = Utc::now() - Duration::hours(2);
        store.insert_ticket(&first).await.unwrap();
        store.insert_ticket(&ticket(2)).await.unwrap();

        let all = store.list_tickets(&TicketQuery::all()).await.unwrap();
        assert_eq!(all[0].id, "TKT-002");
        assert_eq!(all[1].id, "TKT-001");
    }

    #[tokio::test]
    async fn test_update_ticket_preserves_comments() {
        let store = MemoryStore::new();
        let t = ticket(1);
        store.insert_ticket(&t).await.unwrap();

        store
            .append_comment(&Comment {
                id: "comment-1".to_string(),
                ticket_id: t.id.clone(),
                author_id: "user-1".to_string(),
                author_name: "Alex".to_string(),
                content: "hello".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let mut updated = t.clone();
        updated.status = TicketStatus::InProgress;
        updated.comments = Vec::new(); // caller-side copy may be stale
        store.update_ticket(&updated).await.unwrap();

        let fetched = store.get_ticket(&t.id).await.unwrap();
        assert_eq!(fetched.status, TicketStatus::InProgress);
        assert_eq!(fetched.comments.len(), 1);
    }

    #[tokio::test]
    async fn test_count_survives_inserts() {
        let store = MemoryStore::new();
        assert_eq!(store.count_tickets().await.unwrap(), 0);
        store.insert_ticket(&ticket(1)).await.unwrap();
        store.insert_ticket(&ticket(2)).await.unwrap();
        assert_eq!(store.count_tickets().await.unwrap(), 2);
    }
}
