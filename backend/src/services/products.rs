//! Product creation

use rust_decimal::Decimal;
use tracing::{info, warn};

use super::MutationOutcome;
use super::error::CrmResult;
use super::money::{fits_digits, round_half_up, to_cents};
use super::validation::clean_name;
use crate::db::{CreateProduct, Database, ProductRecord};

pub const PRICE_NOT_POSITIVE: &str = "Price must be positive.";
pub const PRICE_TOO_LARGE: &str = "Price must have at most 10 digits.";
pub const NEGATIVE_STOCK: &str = "Stock cannot be negative.";

/// Total digits allowed in a price, two of them after the point
const PRICE_MAX_DIGITS: u32 = 10;

#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub price: Decimal,
    pub stock: Option<i32>,
}

pub struct ProductService {
    db: Database,
}

impl ProductService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Validate and insert a product. The price is stored rounded half-up to
    /// cents; a missing stock means zero.
    pub async fn create(&self, draft: ProductDraft) -> CrmResult<MutationOutcome<ProductRecord>> {
        let mut errors = Vec::new();

        let name = clean_name(&draft.name, &mut errors);

        let price = round_half_up(draft.price);
        let price_cents = if price <= Decimal::ZERO {
            errors.push(PRICE_NOT_POSITIVE.to_string());
            None
        } else if !fits_digits(price, PRICE_MAX_DIGITS) {
            errors.push(PRICE_TOO_LARGE.to_string());
            None
        } else {
            to_cents(price)
        };

        let stock = draft.stock.unwrap_or(0);
        if stock < 0 {
            errors.push(NEGATIVE_STOCK.to_string());
        }

        let price_cents = match price_cents {
            Some(cents) if errors.is_empty() => cents,
            _ => {
                warn!(name = %name, errors = ?errors, "Rejected product");
                return Ok(MutationOutcome::Rejected(errors));
            }
        };

        let product = self
            .db
            .products()
            .create(&CreateProduct {
                name,
                price_cents,
                stock,
            })
            .await?;
        info!(product_id = product.id, price = %product.price, "Product created");
        Ok(MutationOutcome::Created(product))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn draft(name: &str, price: &str, stock: Option<i32>) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            price: Decimal::from_str(price).unwrap(),
            stock,
        }
    }

    async fn service() -> ProductService {
        ProductService::new(Database::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_create_rounds_price_and_defaults_stock() {
        let outcome = service().await.create(draft("Laptop", "999.985", None)).await.unwrap();
        let product = outcome.created().unwrap();
        assert_eq!(product.price.to_string(), "999.99");
        assert_eq!(product.stock, 0);
    }

    #[tokio::test]
    async fn test_create_collects_errors() {
        let outcome = service().await.create(draft("Widget", "0", Some(-1))).await.unwrap();
        assert_eq!(
            outcome,
            MutationOutcome::Rejected(vec![
                PRICE_NOT_POSITIVE.to_string(),
                NEGATIVE_STOCK.to_string(),
            ])
        );
    }

    #[tokio::test]
    async fn test_price_rounding_to_zero_is_not_positive() {
        let outcome = service().await.create(draft("Dust", "0.004", None)).await.unwrap();
        assert_eq!(outcome.errors(), &[PRICE_NOT_POSITIVE.to_string()]);
    }

    #[tokio::test]
    async fn test_price_digit_limit() {
        let service = service().await;
        let outcome = service.create(draft("Yacht", "100000000", Some(1))).await.unwrap();
        assert_eq!(outcome.errors(), &[PRICE_TOO_LARGE.to_string()]);

        let outcome = service.create(draft("Jet", "99999999.99", Some(1))).await.unwrap();
        assert!(outcome.created().is_some());
    }
}
