//! GraphQL DataLoaders for batching relation queries
//!
//! Resolving `allOrders { edges { node { customer products } } }` would issue
//! one query per order without these. Each loader collects the keys requested
//! within the same tick and answers them with a single `IN (...)` query.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dataloader::{DataLoader, Loader};

use super::types::{Customer, Order, Product};
use crate::db::Database;

type LoadError = Arc<anyhow::Error>;

/// Customers by primary key
pub struct CustomerLoader {
    db: Database,
}

impl CustomerLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i64> for CustomerLoader {
    type Value = Customer;
    type Error = LoadError;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading customers");
        let records = self.db.customers().get_many(keys).await.map_err(Arc::new)?;
        Ok(records.into_iter().map(|r| (r.id, Customer::from(r))).collect())
    }
}

/// Orders keyed by customer primary key, newest first
pub struct OrdersByCustomerLoader {
    db: Database,
}

impl OrdersByCustomerLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i64> for OrdersByCustomerLoader {
    type Value = Vec<Order>;
    type Error = LoadError;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading orders for customers");
        let grouped = self
            .db
            .orders()
            .orders_for_customers(keys)
            .await
            .map_err(Arc::new)?;
        Ok(grouped
            .into_iter()
            .map(|(customer_id, orders)| {
                (customer_id, orders.into_iter().map(Order::from).collect())
            })
            .collect())
    }
}

/// Products keyed by order primary key
pub struct ProductsByOrderLoader {
    db: Database,
}

impl ProductsByOrderLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i64> for ProductsByOrderLoader {
    type Value = Vec<Product>;
    type Error = LoadError;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading products for orders");
        let grouped = self
            .db
            .orders()
            .products_for_orders(keys)
            .await
            .map_err(Arc::new)?;
        Ok(grouped
            .into_iter()
            .map(|(order_id, products)| {
                (order_id, products.into_iter().map(Product::from).collect())
            })
            .collect())
    }
}

/// All loaders, ready to be registered as schema data
pub struct Loaders {
    pub customers: DataLoader<CustomerLoader>,
    pub orders_by_customer: DataLoader<OrdersByCustomerLoader>,
    pub products_by_order: DataLoader<ProductsByOrderLoader>,
}

impl Loaders {
    pub fn new(db: &Database) -> Self {
        Self {
            customers: DataLoader::new(CustomerLoader::new(db.clone()), tokio::spawn),
            orders_by_customer: DataLoader::new(
                OrdersByCustomerLoader::new(db.clone()),
                tokio::spawn,
            ),
            products_by_order: DataLoader::new(
                ProductsByOrderLoader::new(db.clone()),
                tokio::spawn,
            ),
        }
    }
}
