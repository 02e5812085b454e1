//! Demo data for a fresh database.
//!
//! Every row is fetched-or-created (customers by email, products by name,
//! the order by its customer) inside a single transaction, so re-running the
//! seed leaves the database unchanged.

use anyhow::Result;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::Database;
use super::customers::{CreateCustomer, get_or_create_customer};
use super::orders::{NewOrder, get_or_create_order};
use super::products::{CreateProduct, get_or_create_product};
use super::sqlite_helpers::now_utc;

/// Result of running seed operations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedResult {
    pub customers_created: usize,
    pub products_created: usize,
    pub orders_created: usize,
}

impl SeedResult {
    pub fn total_created(&self) -> usize {
        self.customers_created + self.products_created + self.orders_created
    }
}

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Alice Johnson", "alice@example.com", "+1234567890"),
    ("Bob Smith", "bob@example.com", "123-456-7890"),
    ("Carol Danvers", "carol@example.com", "+19876543210"),
];

const PRODUCTS: &[(&str, i64, i32)] = &[
    ("Laptop", 99_999, 10),
    ("Smartphone", 69_900, 25),
    ("Headphones", 19_950, 50),
];

/// Products linked to the demo order
const ORDER_PRODUCT_COUNT: usize = 2;

/// Insert the demo customers, products and order if they are missing.
pub async fn run_seeds(db: &Database) -> Result<SeedResult> {
    let mut result = SeedResult::default();
    let mut tx = db.pool().begin().await?;

    let mut first_customer = None;
    for (name, email, phone) in CUSTOMERS {
        let (record, created) = get_or_create_customer(
            &mut tx,
            &CreateCustomer {
                name: name.to_string(),
                email: email.to_lowercase(),
                phone: phone.to_string(),
            },
        )
        .await?;
        if created {
            debug!(customer_id = record.id, email = %record.email, "Seeded customer");
            result.customers_created += 1;
        }
        first_customer.get_or_insert(record);
    }

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (name, price_cents, stock) in PRODUCTS {
        let (record, created) = get_or_create_product(
            &mut tx,
            &CreateProduct {
                name: name.to_string(),
                price_cents: *price_cents,
                stock: *stock,
            },
        )
        .await?;
        if created {
            debug!(product_id = record.id, name = %record.name, "Seeded product");
            result.products_created += 1;
        }
        products.push(record);
    }

    if let Some(customer) = first_customer {
        let linked = &products[..ORDER_PRODUCT_COUNT.min(products.len())];
        let total: Decimal = linked.iter().map(|p| p.price).sum();
        let (order, created) = get_or_create_order(
            &mut tx,
            &NewOrder {
                customer_id: customer.id,
                product_ids: linked.iter().map(|p| p.id).collect(),
                total_amount_cents: linked.iter().map(|p| p.price_cents()).sum(),
                order_date: now_utc(),
            },
        )
        .await?;
        if created {
            debug!(order_id = order.id, total = %total, "Seeded order");
            result.orders_created += 1;
        }
    }

    tx.commit().await?;
    info!(
        customers = result.customers_created,
        products = result.products_created,
        orders = result.orders_created,
        "Seed data applied"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CustomerFilter, OrderFilter, ProductFilter};

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = Database::in_memory().await.unwrap();

        let first = run_seeds(&db).await.unwrap();
        assert_eq!(
            first,
            SeedResult {
                customers_created: 3,
                products_created: 3,
                orders_created: 1,
            }
        );

        let second = run_seeds(&db).await.unwrap();
        assert_eq!(second.total_created(), 0);

        assert_eq!(db.customers().count(&CustomerFilter::default()).await.unwrap(), 3);
        assert_eq!(db.products().count(&ProductFilter::default()).await.unwrap(), 3);
        assert_eq!(db.orders().count(&OrderFilter::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_seed_order_links_first_two_products() {
        let db = Database::in_memory().await.unwrap();
        run_seeds(&db).await.unwrap();
        run_seeds(&db).await.unwrap();

        let orders = db.orders().list(&OrderFilter::default(), &[], 10, 0).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].total_amount.to_string(), "1698.99");

        let linked = db.orders().products_for_orders(&[orders[0].id]).await.unwrap();
        let names: Vec<_> = linked[&orders[0].id].iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Laptop", "Smartphone"]);
    }
}
