//! Decimal amounts and their integer-cent storage form

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits kept for every stored amount
pub const DECIMAL_PLACES: u32 = 2;

/// Round to two decimal places, ties away from zero
pub fn round_half_up(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Whether a rounded amount fits `max_digits` total digits (two of them
/// fractional)
pub fn fits_digits(amount: Decimal, max_digits: u32) -> bool {
    let integer_digits = max_digits.saturating_sub(DECIMAL_PLACES);
    let limit = Decimal::from(10u64.pow(integer_digits));
    round_half_up(amount).abs() < limit
}

/// Convert to integer cents, rounding half-up first
pub fn to_cents(amount: Decimal) -> Option<i64> {
    (round_half_up(amount) * Decimal::ONE_HUNDRED).to_i64()
}

/// Smallest cent value that is `>= amount`, for inclusive lower bounds
pub fn cents_ceil(amount: Decimal) -> Option<i64> {
    amount.checked_mul(Decimal::ONE_HUNDRED)?.ceil().to_i64()
}

/// Largest cent value that is `<= amount`, for inclusive upper bounds
pub fn cents_floor(amount: Decimal) -> Option<i64> {
    amount.checked_mul(Decimal::ONE_HUNDRED)?.floor().to_i64()
}
