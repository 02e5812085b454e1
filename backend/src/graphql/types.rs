//! GraphQL type definitions
//!
//! These types mirror the database records but are decorated with
//! async-graphql attributes. Every entity exposes a Relay global `id`.

use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, ID, InputObject, Interface, Result, SimpleObject};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crm_macros::mutation_result;

use super::global_id::{NodeKind, encode_global_id};
use super::loaders::{CustomerLoader, OrdersByCustomerLoader, ProductsByOrderLoader};
use crate::db::{CustomerRecord, OrderRecord, ProductRecord};
use crate::services::{CustomerDraft, OrderDraft, ProductDraft};

// ============================================================================
// Entities
// ============================================================================

/// A customer of the store
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Customer {
    /// Global ID
    pub id: ID,
    #[graphql(skip)]
    pub pk: i64,
    pub name: String,
    /// Lower-cased, unique
    pub email: String,
    /// Empty when not provided
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl Customer {
    /// Orders placed by this customer, newest first
    async fn orders(&self, ctx: &Context<'_>) -> Result<Vec<Order>> {
        let loader = ctx.data_unchecked::<DataLoader<OrdersByCustomerLoader>>();
        Ok(loader.load_one(self.pk).await?.unwrap_or_default())
    }
}

impl From<CustomerRecord> for Customer {
    fn from(r: CustomerRecord) -> Self {
        Self {
            id: encode_global_id(NodeKind::Customer, r.id),
            pk: r.id,
            name: r.name,
            email: r.email,
            phone: r.phone,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// A product in the catalogue
#[derive(Debug, Clone, SimpleObject)]
pub struct Product {
    /// Global ID
    pub id: ID,
    #[graphql(skip)]
    pub pk: i64,
    pub name: String,
    /// Unit price, two decimal places
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Self {
            id: encode_global_id(NodeKind::Product, r.id),
            pk: r.id,
            name: r.name,
            price: r.price,
            stock: r.stock,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// An order placed by a customer for one or more products
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Order {
    /// Global ID
    pub id: ID,
    #[graphql(skip)]
    pub pk: i64,
    #[graphql(skip)]
    pub customer_id: i64,
    /// Sum of the product prices when the order was placed
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl Order {
    async fn customer(&self, ctx: &Context<'_>) -> Result<Option<Customer>> {
        let loader = ctx.data_unchecked::<DataLoader<CustomerLoader>>();
        Ok(loader.load_one(self.customer_id).await?)
    }

    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        let loader = ctx.data_unchecked::<DataLoader<ProductsByOrderLoader>>();
        Ok(loader.load_one(self.pk).await?.unwrap_or_default())
    }
}

impl From<OrderRecord> for Order {
    fn from(r: OrderRecord) -> Self {
        Self {
            id: encode_global_id(NodeKind::Order, r.id),
            pk: r.id,
            customer_id: r.customer_id,
            total_amount: r.total_amount,
            order_date: r.order_date,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// An object with a global ID
#[derive(Interface)]
#[graphql(field(name = "id", ty = "&ID"))]
pub enum Node {
    Customer(Customer),
    Product(Product),
    Order(Order),
}

crate::define_connection!(CustomerConnection, CustomerEdge, Customer);
crate::define_connection!(ProductConnection, ProductEdge, Product);
crate::define_connection!(OrderConnection, OrderEdge, Order);

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone, InputObject)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    /// `+<7-15 digits>` or `123-456-7890`
    pub phone: Option<String>,
}

impl From<CustomerInput> for CustomerDraft {
    fn from(input: CustomerInput) -> Self {
        Self {
            name: input.name,
            email: input.email,
            phone: input.phone,
        }
    }
}

#[derive(Debug, Clone, InputObject)]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    /// Defaults to 0
    pub stock: Option<i32>,
}

impl From<ProductInput> for ProductDraft {
    fn from(input: ProductInput) -> Self {
        Self {
            name: input.name,
            price: input.price,
            stock: input.stock,
        }
    }
}

#[derive(Debug, Clone, InputObject)]
pub struct OrderInput {
    /// Raw primary key or global ID
    pub customer_id: ID,
    /// Raw primary keys or global IDs; duplicates are ignored
    pub product_ids: Vec<ID>,
    /// Defaults to now
    pub order_date: Option<DateTime<Utc>>,
}

impl From<OrderInput> for OrderDraft {
    fn from(input: OrderInput) -> Self {
        Self {
            customer_id: input.customer_id.0,
            product_ids: input.product_ids.into_iter().map(|id| id.0).collect(),
            order_date: input.order_date,
        }
    }
}

// ============================================================================
// Payloads
// ============================================================================

mutation_result!(CreateCustomerPayload, customer: Customer, message);
mutation_result!(CreateProductPayload, product: Product);
mutation_result!(CreateOrderPayload, order: Order);

/// Result of `bulkCreateCustomers`
#[derive(Debug, Clone, SimpleObject)]
pub struct BulkCreateCustomersPayload {
    /// Inserted customers, in input order
    pub customers: Vec<Customer>,
    /// One `Entry N: ...` message per rejected row
    pub errors: Vec<String>,
}
