//! Entity store implementations for TicketTrack.
//!
//! Two stores implement the repository traits from `ticket-core`:
//!
//! - [`SqliteStore`] - SQLite persistence via SQLx, with embedded migrations
//! - [`MemoryStore`] - in-process maps, no persistence; the default when no
//!   database is configured, also handy for tests
//!
//! # Example
//!
//! ```no_run
//! use store::SqliteStore;
//! use ticket_core::UserStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::connect("sqlite:tickettrack.db?mode=rwc").await?;
//!     store.migrate().await?;
//!
//!     let users = store.list_users().await?;
//!     println!("{} users", users.len());
//!     Ok(())
//! }
//! ```

pub mod category;
pub mod memory;
pub mod rows;
pub mod seed;
pub mod ticket;
pub mod user;

pub use memory::MemoryStore;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use ticket_core::StoreError;

/// Default pool size. High enough for concurrent request handling.
const DEFAULT_POOL_SIZE: u32 = 10;

/// SQLite-backed entity store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `sqlite::memory:` for an in-memory database (tests).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        Self::connect_with_pool_size(url, DEFAULT_POOL_SIZE).await
    }

    /// Connect with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(backend_err)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(backend_err)?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// Call once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Map a SQLx error to an opaque backend error.
pub(crate) fn backend_err(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Map a SQLx insert error, surfacing unique violations as AlreadyExists.
pub(crate) fn insert_err(e: sqlx::Error, entity: &'static str, id: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return StoreError::AlreadyExists {
                entity,
                id: id.to_string(),
            };
        }
    }
    backend_err(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticket_core::{CategoryStore, TicketStore, UserStore};

    pub(crate) async fn test_store() -> SqliteStore {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_connect_and_migrate() {
        let store = test_store().await;

        assert!(store.list_users().await.unwrap().is_empty());
        assert!(store.list_categories().await.unwrap().is_empty());
        assert_eq!(store.count_tickets().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seeded_store() {
        let store = test_store().await;
        seed::seed_demo_data(&store).await.unwrap();

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 5);

        let categories = store.list_categories().await.unwrap();
        assert_eq!(categories.len(), 4);

        // The exemplar seed ticket is Resolved with an upvote.
        let exemplar = store.first_resolved_with_feedback().await.unwrap();
        assert!(exemplar.is_some());
    }
}
