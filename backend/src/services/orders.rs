//! Order creation with transactional product linkage

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::MutationOutcome;
use super::error::CrmResult;
use super::money::{fits_digits, round_half_up, to_cents};
use crate::db::sqlite_helpers::{now_utc, truncate_to_micros};
use crate::db::{Database, NewOrder, OrderRecord};
use crate::graphql::global_id::{NodeKind, parse_entity_id};

pub const INVALID_CUSTOMER_ID: &str = "Invalid customer ID.";
pub const NO_PRODUCTS: &str = "At least one product must be provided.";
pub const CUSTOMER_NOT_FOUND: &str = "Customer not found.";
pub const TOTAL_TOO_LARGE: &str = "Total amount must have at most 12 digits.";

const TOTAL_MAX_DIGITS: u32 = 12;

/// Raw order fields as submitted. IDs may be raw integers or global IDs.
#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
    pub customer_id: String,
    pub product_ids: Vec<String>,
    pub order_date: Option<DateTime<Utc>>,
}

pub struct OrderService {
    db: Database,
}

impl OrderService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Validate and create an order.
    ///
    /// Every check runs before deciding, so the caller receives the complete
    /// list of problems. The total is the sum of the linked products' current
    /// prices.
    pub async fn create(&self, draft: OrderDraft) -> CrmResult<MutationOutcome<OrderRecord>> {
        let mut errors = Vec::new();

        let customer_id = parse_entity_id(&draft.customer_id, NodeKind::Customer);
        if customer_id.is_none() {
            errors.push(INVALID_CUSTOMER_ID.to_string());
        }

        let mut seen = HashSet::new();
        let mut product_ids = Vec::with_capacity(draft.product_ids.len());
        for raw in &draft.product_ids {
            match parse_entity_id(raw, NodeKind::Product) {
                Some(id) => {
                    if seen.insert(id) {
                        product_ids.push(id);
                    }
                }
                None => errors.push(format!("Invalid product ID: {}", raw)),
            }
        }

        if product_ids.is_empty() {
            errors.push(NO_PRODUCTS.to_string());
        }

        if let Some(id) = customer_id {
            if self.db.customers().get_by_id(id).await?.is_none() {
                errors.push(CUSTOMER_NOT_FOUND.to_string());
            }
        }

        let products = if product_ids.is_empty() {
            Vec::new()
        } else {
            self.db.products().get_many(&product_ids).await?
        };
        let found: HashSet<i64> = products.iter().map(|p| p.id).collect();
        let mut missing: Vec<i64> = product_ids
            .iter()
            .copied()
            .filter(|id| !found.contains(id))
            .collect();
        if !missing.is_empty() {
            missing.sort_unstable();
            let listed: Vec<String> = missing.iter().map(|id| id.to_string()).collect();
            errors.push(format!("Invalid product ID(s): {}", listed.join(", ")));
        }

        let total = round_half_up(products.iter().map(|p| p.price).sum::<Decimal>());
        if errors.is_empty() && !fits_digits(total, TOTAL_MAX_DIGITS) {
            errors.push(TOTAL_TOO_LARGE.to_string());
        }

        let (customer_id, total_amount_cents) = match (customer_id, to_cents(total)) {
            (Some(customer_id), Some(cents)) if errors.is_empty() => (customer_id, cents),
            _ => {
                warn!(errors = ?errors, "Rejected order");
                return Ok(MutationOutcome::Rejected(errors));
            }
        };

        let order = self
            .db
            .orders()
            .create(&NewOrder {
                customer_id,
                product_ids,
                total_amount_cents,
                order_date: draft.order_date.map(truncate_to_micros).unwrap_or_else(now_utc),
            })
            .await?;

        info!(
            order_id = order.id,
            customer_id = order.customer_id,
            total = %order.total_amount,
            "Order created"
        );
        Ok(MutationOutcome::Created(order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CreateCustomer, CreateProduct, OrderFilter};
    use crate::graphql::global_id::encode_global_id;
    use chrono::TimeZone;

    struct Fixture {
        db: Database,
        service: OrderService,
        customer_id: i64,
        product_ids: Vec<i64>,
    }

    async fn fixture() -> Fixture {
        let db = Database::in_memory().await.unwrap();
        let customer = db
            .customers()
            .create(&CreateCustomer {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                phone: String::new(),
            })
            .await
            .unwrap()
            .unwrap();
        let mut product_ids = Vec::new();
        for (name, cents) in [("A", 1_005), ("B", 2_010), ("C", 333)] {
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
        Fixture {
            service: OrderService::new(db.clone()),
            db,
            customer_id: customer.id,
            product_ids,
        }
    }

    #[tokio::test]
    async fn test_duplicate_product_ids_are_linked_once() {
        let f = fixture().await;
        let (b, c) = (f.product_ids[1], f.product_ids[2]);
        let outcome = f
            .service
            .create(OrderDraft {
                customer_id: f.customer_id.to_string(),
                product_ids: vec![b.to_string(), b.to_string(), c.to_string()],
                order_date: None,
            })
            .await
            .unwrap();

        let order = outcome.created().unwrap();
        assert_eq!(order.total_amount.to_string(), "23.43");

        let linked = f.db.orders().products_for_orders(&[order.id]).await.unwrap();
        let ids: Vec<i64> = linked[&order.id].iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![b, c]);
    }

    #[tokio::test]
    async fn test_accepts_global_ids_and_order_date() {
        let f = fixture().await;
        let date = Utc.with_ymd_and_hms(2024, 2, 29, 8, 30, 0).unwrap();
        let outcome = f
            .service
            .create(OrderDraft {
                customer_id: encode_global_id(NodeKind::Customer, f.customer_id).0,
                product_ids: vec![encode_global_id(NodeKind::Product, f.product_ids[0]).0],
                order_date: Some(date),
            })
            .await
            .unwrap();

        let order = outcome.created().unwrap();
        assert_eq!(order.order_date, date);
        assert_eq!(order.total_amount.to_string(), "10.05");
    }

    #[tokio::test]
    async fn test_missing_customer_and_product_reported_together() {
        let f = fixture().await;
        let outcome = f
            .service
            .create(OrderDraft {
                customer_id: "999".to_string(),
                product_ids: vec![f.product_ids[0].to_string(), "998".to_string(), "997".to_string()],
                order_date: None,
            })
            .await
            .unwrap();

        assert_eq!(
            outcome.errors(),
            &[
                CUSTOMER_NOT_FOUND.to_string(),
                "Invalid product ID(s): 997, 998".to_string(),
            ]
        );
        assert_eq!(f.db.orders().count(&OrderFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_ids() {
        let f = fixture().await;
        let outcome = f
            .service
            .create(OrderDraft {
                customer_id: "abc".to_string(),
                product_ids: vec!["x1".to_string()],
                order_date: None,
            })
            .await
            .unwrap();

        assert_eq!(
            outcome.errors(),
            &[
                INVALID_CUSTOMER_ID.to_string(),
                "Invalid product ID: x1".to_string(),
                NO_PRODUCTS.to_string(),
            ]
        );
    }
}
