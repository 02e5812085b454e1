//! Orders repository
//!
//! An order row and its `order_products` links are always written together
//! inside one transaction.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteConnection, SqlitePool};
use tracing::debug;

use super::products::ProductRecord;
use super::query::{
    DatabaseEntity, DatabaseFilter, EntityQuery, Predicate, SortField, SortKey, SqlValue,
    placeholders,
};
use super::sqlite_helpers::{datetime_to_str, get_amount, get_datetime, now_utc};

const IN_CHUNK_SIZE: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: i64,
    pub customer_id: i64,
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for OrderRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            total_amount: get_amount(row, "total_amount_cents")?,
            order_date: get_datetime(row, "order_date")?,
            created_at: get_datetime(row, "created_at")?,
            updated_at: get_datetime(row, "updated_at")?,
        })
    }
}

impl DatabaseEntity for OrderRecord {
    const TABLE_NAME: &'static str = "orders";
    const COLUMNS: &'static str =
        "id, customer_id, total_amount_cents, order_date, created_at, updated_at";
    const DEFAULT_ORDER: &'static [SortKey] = &[SortKey::desc("order_date")];
}

/// A validated order. `product_ids` is already de-duplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: i64,
    pub product_ids: Vec<i64>,
    pub total_amount_cents: i64,
    pub order_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub total_amount_gte_cents: Option<i64>,
    pub total_amount_lte_cents: Option<i64>,
    pub order_date_gte: Option<DateTime<Utc>>,
    pub order_date_lte: Option<DateTime<Utc>>,
    pub customer_name: Option<String>,
    pub product_name: Option<String>,
    pub product_id: Option<i64>,
}

impl DatabaseFilter for OrderFilter {
    fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(cents) = self.total_amount_gte_cents {
            predicates.push(Predicate::Gte("total_amount_cents", SqlValue::Int(cents)));
        }
        if let Some(cents) = self.total_amount_lte_cents {
            predicates.push(Predicate::Lte("total_amount_cents", SqlValue::Int(cents)));
        }
        if let Some(gte) = self.order_date_gte {
            predicates.push(Predicate::Gte("order_date", SqlValue::Text(datetime_to_str(gte))));
        }
        if let Some(lte) = self.order_date_lte {
            predicates.push(Predicate::Lte("order_date", SqlValue::Text(datetime_to_str(lte))));
        }
        if let Some(ref name) = self.customer_name {
            predicates.push(Predicate::Related {
                prefix: "customer_id IN (SELECT id FROM customers WHERE ",
                inner: Box::new(Predicate::IContains("name", name.clone())),
            });
        }
        if let Some(ref name) = self.product_name {
            predicates.push(Predicate::Related {
                prefix: "id IN (SELECT op.order_id FROM order_products op JOIN products p ON p.id = op.product_id WHERE ",
                inner: Box::new(Predicate::IContains("p.name", name.clone())),
            });
        }
        if let Some(product_id) = self.product_id {
            predicates.push(Predicate::Related {
                prefix: "id IN (SELECT order_id FROM order_products WHERE ",
                inner: Box::new(Predicate::Eq("product_id", SqlValue::Int(product_id))),
            });
        }
        predicates
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSortField {
    Id,
    Customer,
    TotalAmount,
    OrderDate,
    CreatedAt,
    UpdatedAt,
}

impl SortField for OrderSortField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" | "pk" => Some(Self::Id),
            "customer" | "customer_id" | "customerId" => Some(Self::Customer),
            "total_amount" | "totalAmount" => Some(Self::TotalAmount),
            "order_date" | "orderDate" => Some(Self::OrderDate),
            "created_at" | "createdAt" => Some(Self::CreatedAt),
            "updated_at" | "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Customer => "customer_id",
            Self::TotalAmount => "total_amount_cents",
            Self::OrderDate => "order_date",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get order by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<OrderRecord>> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "{} WHERE id = ?",
            OrderRecord::select_sql()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Create an order and link its products in one transaction
    pub async fn create(&self, order: &NewOrder) -> Result<OrderRecord> {
        let mut tx = self.pool.begin().await?;
        let record = insert_order(&mut tx, order).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// List orders matching a filter
    pub async fn list(
        &self,
        filter: &OrderFilter,
        order: &[SortKey],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrderRecord>> {
        let records = EntityQuery::<OrderRecord>::new()
            .filter(filter)
            .order_by(order)
            .paginate(limit, offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    /// Count orders matching a filter
    pub async fn count(&self, filter: &OrderFilter) -> Result<i64> {
        let count = EntityQuery::<OrderRecord>::new()
            .filter(filter)
            .count(&self.pool)
            .await?;
        Ok(count)
    }

    /// Products linked to each of the given orders, in product default order
    pub async fn products_for_orders(
        &self,
        order_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<ProductRecord>>> {
        let mut by_order: HashMap<i64, Vec<ProductRecord>> = HashMap::new();
        for chunk in order_ids.chunks(IN_CHUNK_SIZE) {
            let sql = format!(
                "SELECT op.order_id AS order_id, p.id AS id, p.name AS name, \
                 p.price_cents AS price_cents, p.stock AS stock, \
                 p.created_at AS created_at, p.updated_at AS updated_at \
                 FROM order_products op JOIN products p ON p.id = op.product_id \
                 WHERE op.order_id IN ({}) ORDER BY p.name ASC, p.id ASC",
                placeholders(chunk.len())
            );
            let mut query = sqlx::query(&sql);
            for id in chunk {
                query = query.bind(*id);
            }
            for row in query.fetch_all(&self.pool).await? {
                let order_id: i64 = row.try_get("order_id")?;
                by_order
                    .entry(order_id)
                    .or_default()
                    .push(ProductRecord::from_row(&row)?);
            }
        }
        Ok(by_order)
    }

    /// Orders placed by each of the given customers, newest first
    pub async fn orders_for_customers(
        &self,
        customer_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<OrderRecord>>> {
        let mut by_customer: HashMap<i64, Vec<OrderRecord>> = HashMap::new();
        for chunk in customer_ids.chunks(IN_CHUNK_SIZE) {
            let sql = format!(
                "{} WHERE customer_id IN ({}) ORDER BY order_date DESC, id DESC",
                OrderRecord::select_sql(),
                placeholders(chunk.len())
            );
            let mut query = sqlx::query_as::<_, OrderRecord>(&sql);
            for id in chunk {
                query = query.bind(*id);
            }
            for record in query.fetch_all(&self.pool).await? {
                by_customer.entry(record.customer_id).or_default().push(record);
            }
        }
        Ok(by_customer)
    }
}

/// Insert an order and its product links on the given connection
pub async fn insert_order(
    conn: &mut SqliteConnection,
    order: &NewOrder,
) -> Result<OrderRecord, sqlx::Error> {
    let now = datetime_to_str(now_utc());
    let record = sqlx::query_as::<_, OrderRecord>(&format!(
        "INSERT INTO orders (customer_id, total_amount_cents, order_date, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING {}",
        OrderRecord::COLUMNS
    ))
    .bind(order.customer_id)
    .bind(order.total_amount_cents)
    .bind(datetime_to_str(order.order_date))
    .bind(&now)
    .bind(&now)
    .fetch_one(&mut *conn)
    .await?;

    link_products(conn, record.id, &order.product_ids).await?;
    debug!(
        order_id = record.id,
        products = order.product_ids.len(),
        "Linked order products"
    );
    Ok(record)
}

/// Add product links to an order. Existing links are left in place.
pub async fn link_products(
    conn: &mut SqliteConnection,
    order_id: i64,
    product_ids: &[i64],
) -> Result<(), sqlx::Error> {
    for product_id in product_ids {
        sqlx::query("INSERT OR IGNORE INTO order_products (order_id, product_id) VALUES (?, ?)")
            .bind(order_id)
            .bind(product_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Replace the product links of an order with exactly `product_ids`.
pub async fn set_product_links(
    conn: &mut SqliteConnection,
    order_id: i64,
    product_ids: &[i64],
) -> Result<(), sqlx::Error> {
    if product_ids.is_empty() {
        sqlx::query("DELETE FROM order_products WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *conn)
            .await?;
    } else {
        let sql = format!(
            "DELETE FROM order_products WHERE order_id = ? AND product_id NOT IN ({})",
            placeholders(product_ids.len())
        );
        let mut query = sqlx::query(&sql).bind(order_id);
        for product_id in product_ids {
            query = query.bind(product_id);
        }
        query.execute(&mut *conn).await?;
    }
    link_products(conn, order_id, product_ids).await
}

/// Fetch the first order of `order.customer_id`, inserting it if absent.
/// An existing order has its product links replaced by `order.product_ids`.
pub async fn get_or_create_order(
    conn: &mut SqliteConnection,
    order: &NewOrder,
) -> Result<(OrderRecord, bool), sqlx::Error> {
    let existing = sqlx::query_as::<_, OrderRecord>(&format!(
        "{} WHERE customer_id = ? ORDER BY id ASC LIMIT 1",
        OrderRecord::select_sql()
    ))
    .bind(order.customer_id)
    .fetch_optional(&mut *conn)
    .await?;

    match existing {
        Some(record) => {
            set_product_links(conn, record.id, &order.product_ids).await?;
            Ok((record, false))
        }
        None => Ok((insert_order(conn, order).await?, true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::db::customers::CreateCustomer;
    use crate::db::products::CreateProduct;
    use chrono::TimeZone;

    async fn seeded() -> (Database, i64, Vec<i64>) {
        let db = Database::in_memory().await.unwrap();
        let customer = db
            .customers()
            .create(&CreateCustomer {
                name: "Alice Johnson".to_string(),
                email: "alice@example.com".to_string(),
                phone: String::new(),
            })
            .await
            .unwrap()
            .unwrap();
        let mut product_ids = Vec::new();
        for (name, cents) in [("Laptop", 99_999), ("Headphones", 19_950)] {
            let product = db
                .products()
                .create(&CreateProduct {
                    name: name.to_string(),
                    price_cents: cents,
                    stock: 1,
                })
                .await
                .unwrap();
            product_ids.push(product.id);
        }
        (db, customer.id, product_ids)
    }

    #[tokio::test]
    async fn test_create_links_products() {
        let (db, customer_id, product_ids) = seeded().await;
        let order = db
            .orders()
            .create(&NewOrder {
                customer_id,
                product_ids: product_ids.clone(),
                total_amount_cents: 119_949,
                order_date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(order.total_amount.to_string(), "1199.49");

        let products = db.orders().products_for_orders(&[order.id]).await.unwrap();
        let names: Vec<_> = products[&order.id].iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Headphones", "Laptop"]);
    }

    #[tokio::test]
    async fn test_related_filters() {
        let (db, customer_id, product_ids) = seeded().await;
        db.orders()
            .create(&NewOrder {
                customer_id,
                product_ids: vec![product_ids[0]],
                total_amount_cents: 99_999,
                order_date: now_utc(),
            })
            .await
            .unwrap();

        let by_customer = OrderFilter {
            customer_name: Some("alice".to_string()),
            ..Default::default()
        };
        assert_eq!(db.orders().count(&by_customer).await.unwrap(), 1);

        let by_product = OrderFilter {
            product_name: Some("phones".to_string()),
            ..Default::default()
        };
        assert_eq!(db.orders().count(&by_product).await.unwrap(), 0);

        let by_product_id = OrderFilter {
            product_id: Some(product_ids[0]),
            ..Default::default()
        };
        assert_eq!(db.orders().count(&by_product_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_or_create_replaces_links() {
        let (db, customer_id, product_ids) = seeded().await;
        let mut order = NewOrder {
            customer_id,
            product_ids: product_ids.clone(),
            total_amount_cents: 119_949,
            order_date: now_utc(),
        };

        let mut tx = db.pool().begin().await.unwrap();
        let (first, created) = get_or_create_order(&mut tx, &order).await.unwrap();
        assert!(created);

        order.product_ids = vec![product_ids[0]];
        let (second, created) = get_or_create_order(&mut tx, &order).await.unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        tx.commit().await.unwrap();

        let linked = db.orders().products_for_orders(&[first.id]).await.unwrap();
        let names: Vec<_> = linked[&first.id].iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Laptop"]);
    }

    #[tokio::test]
    async fn test_orders_for_customers_newest_first() {
        let (db, customer_id, product_ids) = seeded().await;
        for day in [1, 3, 2] {
            db.orders()
                .create(&NewOrder {
                    customer_id,
                    product_ids: vec![product_ids[1]],
                    total_amount_cents: 19_950,
                    order_date: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
                })
                .await
                .unwrap();
        }

        let by_customer = db.orders().orders_for_customers(&[customer_id]).await.unwrap();
        let days: Vec<_> = by_customer[&customer_id]
            .iter()
            .map(|o| o.order_date.format("%d").to_string())
            .collect();
        assert_eq!(days, vec!["03", "02", "01"]);
    }
}
