//! Fungible asset model
//!
//! In-memory stand-in for the platform's asset-transfer primitive. Accounts
//! are string ids; balances and allowances are tracked per account. Moving a
//! third party's funds requires an allowance granted by the owner, which is
//! how both the pull leg of a trade and the custodial-treasury inventory
//! source operate.
//!
//! CRITICAL: All amounts are u128 in the asset's smallest native unit.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur when moving funds
#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u128, available: u128 },

    #[error("insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance { required: u128, available: u128 },
}

/// A fungible asset with per-account balances and allowances.
///
/// # Example
/// ```
/// use buyback_engine_core_rs::Token;
///
/// let mut usd = Token::new("USDP", 6);
/// usd.mint("alice", 1_000_000); // 1.000000
/// usd.transfer("alice", "bob", 250_000).unwrap();
/// assert_eq!(usd.balance_of("alice"), 750_000);
/// assert_eq!(usd.balance_of("bob"), 250_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Display symbol (e.g. "USDP")
    symbol: String,

    /// Number of decimals in the smallest native unit
    decimals: u32,

    /// Minted supply across all accounts
    total_supply: u128,

    /// Balance per account id
    balances: HashMap<String, u128>,

    /// owner -> spender -> approved amount
    allowances: HashMap<String, HashMap<String, u128>>,
}

impl Token {
    pub fn new(symbol: impl Into<String>, decimals: u32) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Create new units in `account`.
    pub fn mint(&mut self, account: &str, amount: u128) {
        *self.balances.entry(account.to_string()).or_insert(0) += amount;
        self.total_supply = self.total_supply.saturating_add(amount);
    }

    /// Balance of `account`; unknown accounts hold zero.
    pub fn balance_of(&self, account: &str) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Set the amount `spender` may move out of `owner`'s balance.
    pub fn approve(&mut self, owner: &str, spender: &str, amount: u128) {
        self.allowances
            .entry(owner.to_string())
            .or_default()
            .insert(spender.to_string(), amount);
    }

    /// Remaining amount `spender` may move out of `owner`'s balance.
    pub fn allowance(&self, owner: &str, spender: &str) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|per_spender| per_spender.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Fails with `InsufficientBalance` and no state change when `from`
    /// cannot cover the amount.
    pub fn transfer(&mut self, from: &str, to: &str, amount: u128) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        *self.balances.entry(from.to_string()).or_insert(0) -= amount;
        *self.balances.entry(to.to_string()).or_insert(0) += amount;
        Ok(())
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`,
    /// consuming allowance.
    ///
    /// A spender moving its own funds needs no allowance. Fails with no
    /// state change when either the allowance or the balance is short.
    pub fn transfer_from(
        &mut self,
        spender: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<(), TokenError> {
        if spender != from {
            let approved = self.allowance(from, spender);
            if approved < amount {
                return Err(TokenError::InsufficientAllowance {
                    required: amount,
                    available: approved,
                });
            }
            // Balance is checked before the allowance is consumed so a failed
            // transfer leaves the approval untouched.
            let available = self.balance_of(from);
            if available < amount {
                return Err(TokenError::InsufficientBalance {
                    required: amount,
                    available,
                });
            }
            self.allowances
                .entry(from.to_string())
                .or_default()
                .insert(spender.to_string(), approved - amount);
        }
        self.transfer(from, to, amount)
    }
}
