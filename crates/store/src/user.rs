//! User CRUD operations.

use async_trait::async_trait;
use sqlx::SqlitePool;
use ticket_core::{StoreError, User, UserStore};

use crate::rows::{encode_ts, UserRow};
use crate::{backend_err, insert_err, SqliteStore};

/// Create a new user.
pub async fn create_user(pool: &SqlitePool, user: &User) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, avatar, role, registration_date, last_login)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.avatar)
    .bind(user.role.as_str())
    .bind(encode_ts(&user.registration_date))
    .bind(encode_ts(&user.last_login))
    .execute(pool)
    .await
    .map_err(|e| insert_err(e, "User", &user.id))?;

    Ok(())
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User, StoreError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, email, avatar, role, registration_date, last_login
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(backend_err)?
    .ok_or_else(|| StoreError::NotFound {
        entity: "User",
        id: id.to_string(),
    })?;

    row.try_into()
}

/// Update an existing user.
pub async fn update_user(pool: &SqlitePool, user: &User) -> Result<(), StoreError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = ?, email = ?, avatar = ?, role = ?, registration_date = ?, last_login = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.avatar)
    .bind(user.role.as_str())
    .bind(encode_ts(&user.registration_date))
    .bind(encode_ts(&user.last_login))
    .bind(&user.id)
    .execute(pool)
    .await
    .map_err(backend_err)?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound {
            entity: "User",
            id: user.id.clone(),
        });
    }

    Ok(())
}

/// Delete a user by ID.
pub async fn delete_user(pool: &SqlitePool, id: &str) -> Result<(), StoreError> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await
    .map_err(backend_err)?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List all users, ordered by name.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, StoreError> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, email, avatar, role, registration_date, last_login
        FROM users
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(backend_err)?;

    rows.into_iter().map(TryInto::try_into).collect()
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        create_user(self.pool(), user).await
    }

    async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        get_user(self.pool(), id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        list_users(self.pool()).await
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        update_user(self.pool(), user).await
    }

    async fn delete_user(&self, id: &str) -> Result<(), StoreError> {
        delete_user(self.pool(), id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ticket_core::Role;

    fn sample_user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            name: format!("User {id}"),
            email: format!("{id}@example.com"),
            avatar: format!("/avatars/{id}.png"),
            role,
            registration_date: Utc::now(),
            last_login: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_user_crud() {
        let store = crate::tests::test_store().await;
        let pool = store.pool();

        // Create
        let user = sample_user("user-1", Role::User);
        create_user(pool, &user).await.unwrap();

        // Read
        let fetched = get_user(pool, "user-1").await.unwrap();
        assert_eq!(fetched, user);

        // Update
        let promoted = User {
            role: Role::Agent,
            ..user.clone()
        };
        update_user(pool, &promoted).await.unwrap();
        let fetched = get_user(pool, "user-1").await.unwrap();
        assert_eq!(fetched.role, Role::Agent);

        // List
        let users = list_users(pool).await.unwrap();
        assert_eq!(users.len(), 1);

        // Delete
        delete_user(pool, "user-1").await.unwrap();
        let result = get_user(pool, "user-1").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_user_rejected() {
        let store = crate::tests::test_store().await;
        let user = sample_user("user-1", Role::User);

        create_user(store.pool(), &user).await.unwrap();
        let result = create_user(store.pool(), &user).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let store = crate::tests::test_store().await;
        let user = sample_user("ghost", Role::User);

        let result = update_user(store.pool(), &user).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }
}
