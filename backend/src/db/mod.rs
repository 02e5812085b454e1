//! Database connection and operations

pub mod customers;
pub mod orders;
pub mod products;
pub mod query;
pub mod schema;
pub mod seed;
pub mod sqlite_helpers;

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

pub use customers::{CreateCustomer, CustomerFilter, CustomerRecord, CustomerRepository};
pub use orders::{NewOrder, OrderFilter, OrderRecord, OrderRepository};
pub use products::{CreateProduct, ProductFilter, ProductRecord, ProductRepository};

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a connection pool and make sure all tables exist.
    ///
    /// The database file is created if missing. Foreign keys are enforced,
    /// the journal runs in WAL mode, and the `REGEXP` function is registered.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid DATABASE_URL '{}'", url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .with_regexp();

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        schema::ensure_schema(&pool)
            .await
            .context("Failed to create database schema")?;

        info!(url = %url, max_connections, "Database connected");
        Ok(Self { pool })
    }

    /// A private in-memory database with the schema applied.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .foreign_keys(true)
            .with_regexp();

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        schema::ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check that the database answers queries
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Get a customers repository
    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    /// Get a products repository
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Get an orders repository
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }
}

/// Whether a database error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => matches!(db_err.kind(), ErrorKind::UniqueViolation),
        _ => false,
    }
}
