//! GraphQL filter input types for list queries
//!
//! Each input field maps onto exactly one typed predicate of the matching
//! database filter. Unset fields are omitted. Values that cannot be turned
//! into a predicate are collected as `<field>: <message>` and reported
//! together as a single error.

use async_graphql::{ID, InputObject};
use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;

use super::global_id::{NodeKind, parse_entity_id};
use crate::db::sqlite_helpers::str_to_datetime;
use crate::db::{CustomerFilter, OrderFilter, ProductFilter};
use crate::services::CrmError;
use crate::services::money::{cents_ceil, cents_floor};

const INVALID_DATETIME: &str = "Enter a valid date/time.";
const INVALID_REGEX: &str = "Enter a valid regular expression.";
const INVALID_NUMBER: &str = "Enter a number.";
const INVALID_INTEGER: &str = "Enter a whole number.";

/// Filter arguments for `allCustomers`
#[derive(InputObject, Default, Clone, Debug)]
pub struct CustomerFilterInput {
    /// Name contains (case-insensitive)
    pub name_icontains: Option<String>,
    /// Email contains (case-insensitive)
    pub email_icontains: Option<String>,
    /// Created at or after
    pub created_at_gte: Option<String>,
    /// Created at or before
    pub created_at_lte: Option<String>,
    /// Phone matches this regular expression
    pub phone_pattern: Option<String>,
}

/// Filter arguments for `allProducts`
#[derive(InputObject, Default, Clone, Debug)]
pub struct ProductFilterInput {
    /// Name contains (case-insensitive)
    pub name_icontains: Option<String>,
    /// Price at least
    pub price_gte: Option<Decimal>,
    /// Price at most
    pub price_lte: Option<Decimal>,
    /// Stock at least
    pub stock_gte: Option<i32>,
    /// Stock at most
    pub stock_lte: Option<i32>,
}

/// Filter arguments for `allOrders`
#[derive(InputObject, Default, Clone, Debug)]
pub struct OrderFilterInput {
    /// Total at least
    pub total_amount_gte: Option<Decimal>,
    /// Total at most
    pub total_amount_lte: Option<Decimal>,
    /// Placed at or after
    pub order_date_gte: Option<String>,
    /// Placed at or before
    pub order_date_lte: Option<String>,
    /// Customer name contains (case-insensitive)
    pub customer_name: Option<String>,
    /// Some product name contains (case-insensitive)
    pub product_name: Option<String>,
    /// Contains this product (raw primary key or global ID)
    pub product_id: Option<ID>,
}

/// Accumulates per-field problems while a filter is translated
#[derive(Default)]
struct FilterErrors(Vec<String>);

impl FilterErrors {
    fn push(&mut self, field: &str, message: &str) {
        self.0.push(format!("{}: {}", field, message));
    }

    fn datetime(&mut self, field: &str, raw: Option<&str>) -> Option<DateTime<Utc>> {
        let raw = raw?;
        match str_to_datetime(raw) {
            Ok(dt) => Some(dt),
            Err(_) => {
                self.push(field, INVALID_DATETIME);
                None
            }
        }
    }

    fn cents(
        &mut self,
        field: &str,
        raw: Option<Decimal>,
        convert: fn(Decimal) -> Option<i64>,
    ) -> Option<i64> {
        let raw = raw?;
        let cents = convert(raw);
        if cents.is_none() {
            self.push(field, INVALID_NUMBER);
        }
        cents
    }

    fn finish<T>(self, filter: T) -> Result<T, CrmError> {
        if self.0.is_empty() {
            Ok(filter)
        } else {
            Err(CrmError::InvalidFilter(self.0.join("; ")))
        }
    }
}

impl CustomerFilterInput {
    pub fn into_filter(self) -> Result<CustomerFilter, CrmError> {
        let mut errors = FilterErrors::default();

        let created_at_gte = errors.datetime("created_at_gte", self.created_at_gte.as_deref());
        let created_at_lte = errors.datetime("created_at_lte", self.created_at_lte.as_deref());

        let phone_pattern = match self.phone_pattern {
            Some(pattern) if Regex::new(&pattern).is_err() => {
                errors.push("phone_pattern", INVALID_REGEX);
                None
            }
            other => other,
        };

        errors.finish(CustomerFilter {
            name_icontains: self.name_icontains,
            email_icontains: self.email_icontains,
            created_at_gte,
            created_at_lte,
            phone_pattern,
        })
    }
}

impl ProductFilterInput {
    pub fn into_filter(self) -> Result<ProductFilter, CrmError> {
        let mut errors = FilterErrors::default();

        let price_gte_cents = errors.cents("price_gte", self.price_gte, cents_ceil);
        let price_lte_cents = errors.cents("price_lte", self.price_lte, cents_floor);

        errors.finish(ProductFilter {
            name_icontains: self.name_icontains,
            price_gte_cents,
            price_lte_cents,
            stock_gte: self.stock_gte,
            stock_lte: self.stock_lte,
        })
    }
}

impl OrderFilterInput {
    pub fn into_filter(self) -> Result<OrderFilter, CrmError> {
        let mut errors = FilterErrors::default();

        let total_amount_gte_cents =
            errors.cents("total_amount_gte", self.total_amount_gte, cents_ceil);
        let total_amount_lte_cents =
            errors.cents("total_amount_lte", self.total_amount_lte, cents_floor);
        let order_date_gte = errors.datetime("order_date_gte", self.order_date_gte.as_deref());
        let order_date_lte = errors.datetime("order_date_lte", self.order_date_lte.as_deref());

        let product_id = match self.product_id {
            Some(raw) => {
                let parsed = parse_entity_id(&raw, NodeKind::Product);
                if parsed.is_none() {
                    errors.push("product_id", INVALID_INTEGER);
                }
                parsed
            }
            None => None,
        };

        errors.finish(OrderFilter {
            total_amount_gte_cents,
            total_amount_lte_cents,
            order_date_gte,
            order_date_lte,
            customer_name: self.customer_name,
            product_name: self.product_name,
            product_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use std::str::FromStr;

    #[test]
    fn test_unset_fields_stay_unset() {
        let filter = CustomerFilterInput::default().into_filter().unwrap();
        assert!(filter.name_icontains.is_none());
        assert!(filter.created_at_gte.is_none());
        assert!(filter.phone_pattern.is_none());
    }

    #[test]
    fn test_customer_dates_parse() {
        let filter = CustomerFilterInput {
            created_at_gte: Some("2024-01-01".to_string()),
            created_at_lte: Some("2024-01-31T23:59:59Z".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(
            filter.created_at_gte,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            filter.created_at_lte,
            Some(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn test_errors_are_joined() {
        let result = CustomerFilterInput {
            created_at_gte: Some("last tuesday".to_string()),
            phone_pattern: Some("(".to_string()),
            ..Default::default()
        }
        .into_filter();

        assert_matches!(result, Err(CrmError::InvalidFilter(message)) => {
            assert_eq!(
                message,
                "created_at_gte: Enter a valid date/time.; phone_pattern: Enter a valid regular expression."
            );
        });
    }

    #[test]
    fn test_price_bounds_are_inclusive_in_cents() {
        let filter = ProductFilterInput {
            price_gte: Some(Decimal::from(100)),
            price_lte: Some(Decimal::from_str("500.005").unwrap()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.price_gte_cents, Some(10_000));
        assert_eq!(filter.price_lte_cents, Some(50_000));
    }

    #[test]
    fn test_order_product_id() {
        let filter = OrderFilterInput {
            product_id: Some(ID::from("3")),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.product_id, Some(3));

        let result = OrderFilterInput {
            product_id: Some(ID::from("three")),
            ..Default::default()
        }
        .into_filter();
        assert_matches!(result, Err(CrmError::InvalidFilter(message)) => {
            assert_eq!(message, "product_id: Enter a whole number.");
        });
    }
}
