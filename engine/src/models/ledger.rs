//! External debt ledger boundary
//!
//! The ledger records outstanding obligations the engine is indirectly
//! funding. The engine reads `total_debt` and the ledger account's
//! payment-asset balance to size its demand cap, and notifies the ledger of
//! every repayment. Debt accrual itself happens outside the engine via
//! `set_total_debt`.

use serde::{Deserialize, Serialize};

/// In-memory record of outstanding debt and cumulative repayments.
///
/// `repay` never fails: amounts beyond the outstanding debt simply clear it.
/// The ledger's payment-asset holdings live in the payment token under the
/// ledger's account id, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtLedger {
    outstanding: u128,
    total_repaid: u128,
}

impl DebtLedger {
    pub fn new(outstanding: u128) -> Self {
        Self {
            outstanding,
            total_repaid: 0,
        }
    }

    /// Total outstanding debt in payment-asset units.
    pub fn total_debt(&self) -> u128 {
        self.outstanding
    }

    /// Replace the outstanding debt (external accrual or write-off).
    pub fn set_total_debt(&mut self, amount: u128) {
        self.outstanding = amount;
    }

    /// Record a repayment of `amount` payment-asset units.
    pub fn repay(&mut self, amount: u128) {
        self.outstanding = self.outstanding.saturating_sub(amount);
        self.total_repaid = self.total_repaid.saturating_add(amount);
    }

    /// Cumulative repayments received over the ledger's lifetime.
    pub fn total_repaid(&self) -> u128 {
        self.total_repaid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repay_reduces_outstanding() {
        let mut ledger = DebtLedger::new(1_000);
        ledger.repay(300);
        assert_eq!(ledger.total_debt(), 700);
        assert_eq!(ledger.total_repaid(), 300);
    }

    #[test]
    fn test_repay_beyond_outstanding_clears_debt() {
        let mut ledger = DebtLedger::new(100);
        ledger.repay(250);
        assert_eq!(ledger.total_debt(), 0);
        assert_eq!(ledger.total_repaid(), 250);
    }

    #[test]
    fn test_set_total_debt() {
        let mut ledger = DebtLedger::new(0);
        ledger.set_total_debt(5_000);
        assert_eq!(ledger.total_debt(), 5_000);
    }
}
