//! External price oracle boundary
//!
//! The engine never stores a price; every quote and every trade reads the
//! oracle registered under the engine's `oracle_ref` at call time. Prices are
//! u128 scaled by 10^18 and mean "payment-asset value of one whole sell-asset
//! unit". No staleness or liveness contract is assumed beyond "returns the
//! current best estimate".

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur reading a price source
#[derive(Debug, Error, PartialEq)]
pub enum OracleError {
    #[error("oracle read failed: {0}")]
    Unavailable(String),
}

/// External price source.
///
/// Implementations may fail; a failed read aborts the enclosing operation.
pub trait PriceOracle: std::fmt::Debug {
    /// Current price, scaled by 10^18.
    fn price(&self) -> Result<u128, OracleError>;
}

/// Fixed-rate oracle; the standard implementation for simulations and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticOracle {
    price_e18: u128,
}

impl StaticOracle {
    pub fn new(price_e18: u128) -> Self {
        Self { price_e18 }
    }

    pub fn set_price(&mut self, price_e18: u128) {
        self.price_e18 = price_e18;
    }
}

impl PriceOracle for StaticOracle {
    fn price(&self) -> Result<u128, OracleError> {
        Ok(self.price_e18)
    }
}
