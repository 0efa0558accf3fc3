//! Demand estimator
//!
//! The engine absorbs payment-asset only up to what is needed to clear the
//! recorded debt and restore the configured reserve buffer. If the ledger
//! already holds enough, demand is zero; it is never negative.

/// Payment-asset shortfall:
/// `max(0, baseline_buffer + total_debt - ledger_balance)`.
///
/// # Example
/// ```
/// use buyback_engine_core_rs::demand::shortfall;
///
/// assert_eq!(shortfall(500, 1_000, 200), 1_300);
/// assert_eq!(shortfall(500, 1_000, 2_000), 0);
/// ```
pub fn shortfall(baseline_buffer: u128, total_debt: u128, ledger_balance: u128) -> u128 {
    baseline_buffer
        .saturating_add(total_debt)
        .saturating_sub(ledger_balance)
}
