//! Admin surface: category management and user administration.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use ticket_core::{validation, Category, Role, User};

use crate::error::WorkflowError;
use crate::service::TicketService;

impl TicketService {
    /// Create a category. Names are unique.
    pub async fn create_category(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Category, WorkflowError> {
        validation::validate_category_name(name)?;

        let name = name.trim();
        if self.store().find_category_by_name(name).await?.is_some() {
            return Err(WorkflowError::InvalidState(format!(
                "category name already in use: {name}"
            )));
        }

        let category = Category {
            id: format!("cat-{}", Uuid::new_v4()),
            name: name.to_string(),
            description: description.trim().to_string(),
        };
        self.store().insert_category(&category).await?;

        info!("Created category {} ({})", category.id, category.name);
        Ok(category)
    }

    /// Rename or re-describe a category.
    pub async fn update_category(
        &self,
        id: &str,
        name: &str,
        description: &str,
    ) -> Result<Category, WorkflowError> {
        validation::validate_category_name(name)?;

        let name = name.trim();
        if let Some(existing) = self.store().find_category_by_name(name).await? {
            if existing.id != id {
                return Err(WorkflowError::InvalidState(format!(
                    "category name already in use: {name}"
                )));
            }
        }

        let mut category = self.store().get_category(id).await?;
        category.name = name.to_string();
        category.description = description.trim().to_string();
        self.store().update_category(&category).await?;

        Ok(category)
    }

    /// Delete a category.
    ///
    /// Deletion is blocked while any ticket still references the category,
    /// so tickets never end up with an orphaned reference.
    pub async fn delete_category(&self, id: &str) -> Result<(), WorkflowError> {
        // Resolve first so a missing category reports NotFound, not in-use.
        let category = self.store().get_category(id).await?;

        let referencing = self.store().count_tickets_in_category(id).await?;
        if referencing > 0 {
            return Err(WorkflowError::InvalidState(format!(
                "category {} is still referenced by {} ticket(s)",
                category.name, referencing
            )));
        }

        self.store().delete_category(id).await?;
        info!("Deleted category {} ({})", id, category.name);
        Ok(())
    }

    /// List all categories.
    pub async fn list_categories(&self) -> Result<Vec<Category>, WorkflowError> {
        Ok(self.store().list_categories().await?)
    }

    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<User>, WorkflowError> {
        Ok(self.store().list_users().await?)
    }

    /// Fetch a user.
    pub async fn get_user(&self, id: &str) -> Result<User, WorkflowError> {
        Ok(self.store().get_user(id).await?)
    }

    /// Change a user's role.
    pub async fn change_role(&self, user_id: &str, role: Role) -> Result<User, WorkflowError> {
        let mut user = self.store().get_user(user_id).await?;
        if user.role == role {
            return Ok(user);
        }

        let previous = user.role;
        user.role = role;
        self.store().update_user(&user).await?;

        info!("Changed role of {} from {} to {}", user.id, previous, role);
        Ok(user)
    }

    /// Delete a user. Their tickets and comments remain.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), WorkflowError> {
        self.store().delete_user(user_id).await?;
        info!("Deleted user {}", user_id);
        Ok(())
    }

    /// Record a login, bumping the user's last-login timestamp.
    pub async fn record_login(&self, user_id: &str) -> Result<User, WorkflowError> {
        let mut user = self.store().get_user(user_id).await?;
        user.last_login = Utc::now();
        self.store().update_user(&user).await?;
        Ok(user)
    }
}
