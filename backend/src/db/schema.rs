//! Table bootstrap
//!
//! Idempotent `CREATE ... IF NOT EXISTS` statements run at startup. Columns
//! are never renamed or retyped here; a changed layout requires a fresh
//! database file.

use sqlx::SqlitePool;
use tracing::{debug, info};

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL CHECK (length(name) <= 255),
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        phone TEXT NOT NULL DEFAULT '' CHECK (length(phone) <= 32),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL CHECK (length(name) <= 255),
        price_cents INTEGER NOT NULL CHECK (price_cents >= 1),
        stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
        total_amount_cents INTEGER NOT NULL CHECK (total_amount_cents >= 0),
        order_date TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS order_products (
        order_id INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
        PRIMARY KEY (order_id, product_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_orders_customer_id ON orders(customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_order_date ON orders(order_date)",
    "CREATE INDEX IF NOT EXISTS idx_order_products_product_id ON order_products(product_id)",
    "CREATE INDEX IF NOT EXISTS idx_products_name ON products(name)",
    "CREATE INDEX IF NOT EXISTS idx_customers_name ON customers(name)",
];

/// Create all tables and indexes that do not exist yet.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in STATEMENTS {
        debug!(sql = %statement.trim(), "Applying schema statement");
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    info!(statements = STATEMENTS.len(), "Database schema ensured");
    Ok(())
}
