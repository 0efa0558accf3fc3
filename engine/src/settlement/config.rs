//! Engine configuration
//!
//! Everything the engine needs is supplied once at construction through
//! `EngineConfig`, typically loaded from a JSON document. The inventory
//! source is the one structural degree of freedom between deployments:
//! a custodial treasury spent via allowance, or the engine's own balance.

use serde::{Deserialize, Serialize};

use crate::models::token::{Token, TokenError};

/// Where the engine's sell-asset inventory lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InventorySource {
    /// A custodial account that granted the engine an allowance.
    Treasury { account: String },

    /// The engine pays out of its own balance.
    SelfFunded,
}

impl InventorySource {
    /// Sell-asset the source can pay out right now.
    ///
    /// For a treasury this is capped by both its balance and the allowance
    /// it granted the engine.
    pub fn balance_available(&self, engine_account: &str, sell: &Token) -> u128 {
        match self {
            InventorySource::Treasury { account } => sell
                .balance_of(account)
                .min(sell.allowance(account, engine_account)),
            InventorySource::SelfFunded => sell.balance_of(engine_account),
        }
    }

    /// Verify the source can cover `amount`, with the same error a transfer
    /// would produce. Used to front-load every failure before funds move.
    pub fn ensure_available(
        &self,
        engine_account: &str,
        sell: &Token,
        amount: u128,
    ) -> Result<(), TokenError> {
        match self {
            InventorySource::Treasury { account } => {
                let balance = sell.balance_of(account);
                if balance < amount {
                    return Err(TokenError::InsufficientBalance {
                        required: amount,
                        available: balance,
                    });
                }
                let allowance = sell.allowance(account, engine_account);
                if allowance < amount {
                    return Err(TokenError::InsufficientAllowance {
                        required: amount,
                        available: allowance,
                    });
                }
                Ok(())
            }
            InventorySource::SelfFunded => {
                let balance = sell.balance_of(engine_account);
                if balance < amount {
                    return Err(TokenError::InsufficientBalance {
                        required: amount,
                        available: balance,
                    });
                }
                Ok(())
            }
        }
    }

    /// Pay `amount` sell-asset from the source to `to`.
    pub fn transfer_out(
        &self,
        engine_account: &str,
        sell: &mut Token,
        to: &str,
        amount: u128,
    ) -> Result<(), TokenError> {
        match self {
            InventorySource::Treasury { account } => {
                sell.transfer_from(engine_account, account, to, amount)
            }
            InventorySource::SelfFunded => sell.transfer(engine_account, to, amount),
        }
    }
}

/// Complete engine configuration.
///
/// Validated by `BuybackEngine::new`; construction fails outright on an
/// out-of-range discount or a misordered admin discount window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The engine's own account id
    pub account: String,

    /// Unconstrained authority
    pub owner: String,

    /// Secondary authority, constrained by the admin windows
    pub admin: String,

    /// Registry id of the price oracle to consult
    pub oracle_ref: String,

    /// Registry id of the debt ledger to fund
    pub ledger_ref: String,

    /// Sell-asset inventory source
    pub inventory: InventorySource,

    /// Discount off the oracle price, in basis points
    pub discount_bps: u16,

    /// Admin discount window (owner writes bypass it)
    pub min_admin_discount_bps: u16,
    pub max_admin_discount_bps: u16,

    /// Payment-asset reserve the ledger should retain
    pub baseline_buffer: u128,

    /// Admin baseline window (owner writes bypass it)
    pub min_admin_baseline: u128,
    pub max_admin_baseline: u128,
}

impl EngineConfig {
    /// Parse a configuration document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "account": "ENGINE",
            "owner": "owner",
            "admin": "admin",
            "oracle_ref": "ORACLE",
            "ledger_ref": "LEDGER",
            "inventory": { "Treasury": { "account": "TREASURY" } },
            "discount_bps": 50,
            "min_admin_discount_bps": 0,
            "max_admin_discount_bps": 200,
            "baseline_buffer": 1000000,
            "min_admin_baseline": 0,
            "max_admin_baseline": 5000000
        }"#;

        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.discount_bps, 50);
        assert_eq!(
            config.inventory,
            InventorySource::Treasury {
                account: "TREASURY".to_string()
            }
        );
        assert_eq!(config.baseline_buffer, 1_000_000);
    }

    #[test]
    fn test_self_funded_round_trips_through_json() {
        let config = EngineConfig {
            account: "ENGINE".to_string(),
            owner: "owner".to_string(),
            admin: "admin".to_string(),
            oracle_ref: "ORACLE".to_string(),
            ledger_ref: "LEDGER".to_string(),
            inventory: InventorySource::SelfFunded,
            discount_bps: 0,
            min_admin_discount_bps: 0,
            max_admin_discount_bps: 0,
            baseline_buffer: 0,
            min_admin_baseline: 0,
            max_admin_baseline: 0,
        };

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_treasury_availability_is_capped_by_allowance() {
        let mut sell = Token::new("WSTK", 18);
        sell.mint("TREASURY", 1_000);
        sell.approve("TREASURY", "ENGINE", 600);

        let source = InventorySource::Treasury {
            account: "TREASURY".to_string(),
        };
        assert_eq!(source.balance_available("ENGINE", &sell), 600);
        assert!(source.ensure_available("ENGINE", &sell, 600).is_ok());
        assert_eq!(
            source.ensure_available("ENGINE", &sell, 601),
            Err(TokenError::InsufficientAllowance {
                required: 601,
                available: 600,
            })
        );
    }

    #[test]
    fn test_self_funded_uses_engine_balance() {
        let mut sell = Token::new("WSTK", 18);
        sell.mint("ENGINE", 250);

        let source = InventorySource::SelfFunded;
        assert_eq!(source.balance_available("ENGINE", &sell), 250);

        source.transfer_out("ENGINE", &mut sell, "alice", 100).unwrap();
        assert_eq!(sell.balance_of("alice"), 100);
        assert_eq!(sell.balance_of("ENGINE"), 150);
    }
}
