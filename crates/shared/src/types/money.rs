//! Monetary rounding helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every monetary amount in the system is a `rust_decimal::Decimal`,
//! rounded to two decimal places with banker's rounding at the boundary
//! where a derived value is stored.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places carried by every stored monetary amount.
pub const MONEY_DP: u32 = 2;

/// Rounds a monetary amount to two decimal places.
///
/// Uses banker's rounding (round half to even) to minimize cumulative
/// errors across many line items.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointNearestEven)
}

/// Returns `pct` percent of `amount`, unrounded.
///
/// Callers round the result once, at the boundary where it is stored.
#[must_use]
pub fn percent_of(amount: Decimal, pct: Decimal) -> Decimal {
    amount * pct / Decimal::ONE_HUNDRED
}
