//! Category CRUD operations.

use async_trait::async_trait;
use sqlx::SqlitePool;
use ticket_core::{Category, CategoryStore, StoreError};

use crate::rows::CategoryRow;
use crate::{backend_err, insert_err, SqliteStore};

/// Create a new category.
pub async fn create_category(pool: &SqlitePool, category: &Category) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO categories (id, name, description)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&category.id)
    .bind(&category.name)
    .bind(&category.description)
    .execute(pool)
    .await
    .map_err(|e| insert_err(e, "Category", &category.id))?;

    Ok(())
}

/// Get a category by ID.
pub async fn get_category(pool: &SqlitePool, id: &str) -> Result<Category, StoreError> {
    let row = sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT id, name, description
        FROM categories
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(backend_err)?
    .ok_or_else(|| StoreError::NotFound {
        entity: "Category",
        id: id.to_string(),
    })?;

    Ok(row.into())
}

/// Find a category by its unique name.
pub async fn find_category_by_name(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<Category>, StoreError> {
    let row = sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT id, name, description
        FROM categories
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(backend_err)?;

    Ok(row.map(Into::into))
}

/// List all categories, ordered by id.
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<Category>, StoreError> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT id, name, description
        FROM categories
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(backend_err)?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Update an existing category.
pub async fn update_category(pool: &SqlitePool, category: &Category) -> Result<(), StoreError> {
    let result = sqlx::query(
        r#"
        UPDATE categories
        SET name = ?, description = ?
        WHERE id = ?
        "#,
    )
    .bind(&category.name)
    .bind(&category.description)
    .bind(&category.id)
    .execute(pool)
    .await
    .map_err(backend_err)?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound {
            entity: "Category",
            id: category.id.clone(),
        });
    }

    Ok(())
}

/// Delete a category by ID.
pub async fn delete_category(pool: &SqlitePool, id: &str) -> Result<(), StoreError> {
    let result = sqlx::query(
        r#"
        DELETE FROM categories
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await
    .map_err(backend_err)?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound {
            entity: "Category",
            id: id.to_string(),
        });
    }

    Ok(())
}

#[async_trait]
impl CategoryStore for SqliteStore {
    async fn insert_category(&self, category: &Category) -> Result<(), StoreError> {
        create_category(self.pool(), category).await
    }

    async fn get_category(&self, id: &str) -> Result<Category, StoreError> {
        get_category(self.pool(), id).await
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        find_category_by_name(self.pool(), name).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        list_categories(self.pool()).await
    }

    async fn update_category(&self, category: &Category) -> Result<(), StoreError> {
        update_category(self.pool(), category).await
    }

    async fn delete_category(&self, id: &str) -> Result<(), StoreError> {
        delete_category(self.pool(), id).await
    }
}
