//! Price engine
//!
//! Applies the governed discount to the oracle price and converts between
//! payment-asset and sell-asset quantities at that rate.
//!
//! # Critical Invariants
//!
//! - Both conversions round down. The engine receives at least as much value
//!   as advertised and never overpays sell-asset; the counterparty absorbs
//!   the sub-unit remainder.
//! - The conversions are exact rationals regardless of which asset has more
//!   decimal places (256-bit intermediates, see `math`).
//! - An effective price of zero makes every conversion undefined and is fatal
//!   to the enclosing call.

use thiserror::Error;

use crate::math::{mul_div_floor, pow10};

/// Basis-point denominator.
pub const MAX_BPS: u16 = 10_000;

/// Oracle prices are scaled by 10^18.
pub const PRICE_DECIMALS: u32 = 18;

/// Errors that can occur computing a price or conversion
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("effective price is zero")]
    ZeroPrice,

    #[error("conversion result does not fit in 128 bits")]
    Overflow,
}

/// Oracle price after a basis-point discount, rounded down.
///
/// Equals the oracle price exactly when the discount is zero.
///
/// # Example
/// ```
/// use buyback_engine_core_rs::pricing::effective_price;
///
/// let oracle = 2_000_000_000_000_000_000_000u128; // 2000.0 scaled 1e18
/// assert_eq!(effective_price(oracle, 0).unwrap(), oracle);
/// assert_eq!(
///     effective_price(oracle, 250).unwrap(),
///     1_950_000_000_000_000_000_000, // 2.5% off
/// );
/// ```
pub fn effective_price(oracle_price: u128, discount_bps: u16) -> Result<u128, PricingError> {
    let keep = u128::from(MAX_BPS.saturating_sub(discount_bps));
    mul_div_floor(oracle_price, keep, u128::from(MAX_BPS)).ok_or(PricingError::Overflow)
}

/// Sell-asset units bought by `payment` payment-asset units at `price`.
///
/// Computes `payment * 10^(18 + sell_decimals - payment_decimals) / price`
/// as an exact rational, rounded down at the smallest sell-asset unit.
pub fn sell_out_for_payment(
    payment: u128,
    price: u128,
    payment_decimals: u32,
    sell_decimals: u32,
) -> Result<u128, PricingError> {
    if price == 0 {
        return Err(PricingError::ZeroPrice);
    }
    if sell_decimals >= payment_decimals {
        let scale =
            pow10(PRICE_DECIMALS + sell_decimals - payment_decimals).ok_or(PricingError::Overflow)?;
        mul_div_floor(payment, scale, price).ok_or(PricingError::Overflow)
    } else {
        // The payment asset is the finer-grained one; fold the decimal gap
        // into the divisor so the rational stays exact.
        let gap = pow10(payment_decimals - sell_decimals).ok_or(PricingError::Overflow)?;
        let divisor = price.checked_mul(gap).ok_or(PricingError::Overflow)?;
        let scale = pow10(PRICE_DECIMALS).ok_or(PricingError::Overflow)?;
        mul_div_floor(payment, scale, divisor).ok_or(PricingError::Overflow)
    }
}

/// Payment-asset units owed for `sell` sell-asset units at `price`.
///
/// Exact algebraic inverse of `sell_out_for_payment`, rounded down.
pub fn payment_in_for_sell(
    sell: u128,
    price: u128,
    payment_decimals: u32,
    sell_decimals: u32,
) -> Result<u128, PricingError> {
    if price == 0 {
        return Err(PricingError::ZeroPrice);
    }
    if sell_decimals >= payment_decimals {
        let scale =
            pow10(PRICE_DECIMALS + sell_decimals - payment_decimals).ok_or(PricingError::Overflow)?;
        mul_div_floor(sell, price, scale).ok_or(PricingError::Overflow)
    } else {
        let gap = pow10(payment_decimals - sell_decimals).ok_or(PricingError::Overflow)?;
        let factor = price.checked_mul(gap).ok_or(PricingError::Overflow)?;
        let scale = pow10(PRICE_DECIMALS).ok_or(PricingError::Overflow)?;
        mul_div_floor(sell, factor, scale).ok_or(PricingError::Overflow)
    }
}
