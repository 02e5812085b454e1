//! Products repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteConnection, SqlitePool};

use super::query::{
    DatabaseEntity, DatabaseFilter, EntityQuery, Predicate, SortField, SortKey, SqlValue,
    placeholders,
};
use super::sqlite_helpers::{datetime_to_str, get_amount, get_datetime, now_utc};

const IN_CHUNK_SIZE: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Price in integer cents as stored
    pub fn price_cents(&self) -> i64 {
        (self.price * Decimal::ONE_HUNDRED).to_i64().unwrap_or_default()
    }
}

impl<'r> FromRow<'r, SqliteRow> for ProductRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: get_amount(row, "price_cents")?,
            stock: row.try_get("stock")?,
            created_at: get_datetime(row, "created_at")?,
            updated_at: get_datetime(row, "updated_at")?,
        })
    }
}

impl DatabaseEntity for ProductRecord {
    const TABLE_NAME: &'static str = "products";
    const COLUMNS: &'static str = "id, name, price_cents, stock, created_at, updated_at";
    const DEFAULT_ORDER: &'static [SortKey] = &[SortKey::asc("name")];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProduct {
    pub name: String,
    pub price_cents: i64,
    pub stock: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub name_icontains: Option<String>,
    pub price_gte_cents: Option<i64>,
    pub price_lte_cents: Option<i64>,
    pub stock_gte: Option<i32>,
    pub stock_lte: Option<i32>,
}

impl DatabaseFilter for ProductFilter {
    fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(ref name) = self.name_icontains {
            predicates.push(Predicate::IContains("name", name.clone()));
        }
        if let Some(cents) = self.price_gte_cents {
            predicates.push(Predicate::Gte("price_cents", SqlValue::Int(cents)));
        }
        if let Some(cents) = self.price_lte_cents {
            predicates.push(Predicate::Lte("price_cents", SqlValue::Int(cents)));
        }
        if let Some(stock) = self.stock_gte {
            predicates.push(Predicate::Gte("stock", SqlValue::Int(stock.into())));
        }
        if let Some(stock) = self.stock_lte {
            predicates.push(Predicate::Lte("stock", SqlValue::Int(stock.into())));
        }
        predicates
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortField {
    Id,
    Name,
    Price,
    Stock,
    CreatedAt,
    UpdatedAt,
}

impl SortField for ProductSortField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" | "pk" => Some(Self::Id),
            "name" => Some(Self::Name),
            "price" => Some(Self::Price),
            "stock" => Some(Self::Stock),
            "created_at" | "createdAt" => Some(Self::CreatedAt),
            "updated_at" | "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Price => "price_cents",
            Self::Stock => "stock",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get product by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<ProductRecord>> {
        let record = sqlx::query_as::<_, ProductRecord>(&format!(
            "{} WHERE id = ?",
            ProductRecord::select_sql()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Get products by a set of IDs (unordered, missing IDs are skipped)
    pub async fn get_many(&self, ids: &[i64]) -> Result<Vec<ProductRecord>> {
        let mut records = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(IN_CHUNK_SIZE) {
            let sql = format!(
                "{} WHERE id IN ({})",
                ProductRecord::select_sql(),
                placeholders(chunk.len())
            );
            let mut query = sqlx::query_as::<_, ProductRecord>(&sql);
            for id in chunk {
                query = query.bind(*id);
            }
            records.extend(query.fetch_all(&self.pool).await?);
        }
        Ok(records)
    }

    /// Insert a product
    pub async fn create(&self, product: &CreateProduct) -> Result<ProductRecord> {
        let mut conn = self.pool.acquire().await?;
        Ok(insert_product(&mut conn, product).await?)
    }

    /// List products matching a filter
    pub async fn list(
        &self,
        filter: &ProductFilter,
        order: &[SortKey],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProductRecord>> {
        let records = EntityQuery::<ProductRecord>::new()
            .filter(filter)
            .order_by(order)
            .paginate(limit, offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    /// Count products matching a filter
    pub async fn count(&self, filter: &ProductFilter) -> Result<i64> {
        let count = EntityQuery::<ProductRecord>::new()
            .filter(filter)
            .count(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Insert a product on the given connection
pub async fn insert_product(
    conn: &mut SqliteConnection,
    product: &CreateProduct,
) -> Result<ProductRecord, sqlx::Error> {
    let now = datetime_to_str(now_utc());
    sqlx::query_as::<_, ProductRecord>(&format!(
        "INSERT INTO products (name, price_cents, stock, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING {}",
        ProductRecord::COLUMNS
    ))
    .bind(&product.name)
    .bind(product.price_cents)
    .bind(product.stock)
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await
}

/// Fetch the first product named `product.name`, inserting it if absent.
pub async fn get_or_create_product(
    conn: &mut SqliteConnection,
    product: &CreateProduct,
) -> Result<(ProductRecord, bool), sqlx::Error> {
    let existing = sqlx::query_as::<_, ProductRecord>(&format!(
        "{} WHERE name = ? ORDER BY id ASC LIMIT 1",
        ProductRecord::select_sql()
    ))
    .bind(&product.name)
    .fetch_optional(&mut *conn)
    .await?;

    match existing {
        Some(record) => Ok((record, false)),
        None => Ok((insert_product(conn, product).await?, true)),
    }
}
