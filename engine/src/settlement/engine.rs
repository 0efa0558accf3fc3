//! Buyback engine core
//!
//! Holds the governed configuration and answers the read-side queries: demand
//! cap, effective price, and quote conversions. All of these are computed on
//! demand from the live oracle and ledger, never cached, so a quote always
//! reflects the collaborators' state at call time. Reads carry no lock and
//! may be issued while a trade is in flight; the demand cap applied inside
//! the trade protocols is what bounds the damage of a stale quote.
//!
//! The trade protocols live in `trade`, the parameter writes in `governance`.

use std::cell::Cell;

use thiserror::Error;

use crate::demand;
use crate::models::oracle::OracleError;
use crate::models::state::MarketState;
use crate::models::token::TokenError;
use crate::pricing::{self, PricingError, MAX_BPS};

use super::config::{EngineConfig, InventorySource};

/// Errors that can occur operating the engine
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("trading is paused")]
    Paused,

    #[error("reentrant call rejected")]
    ReentrantCall,

    #[error("caller {caller} is neither owner nor admin")]
    Unauthorized { caller: String },

    #[error("caller {caller} is not the owner")]
    NotOwner { caller: String },

    #[error("value {value} outside admin window [{min}, {max}]")]
    OutsideAdminWindow { value: u128, min: u128, max: u128 },

    #[error("discount {bps} bps exceeds 10000 bps")]
    DiscountOutOfRange { bps: u16 },

    #[error("admin discount bounds invalid: min {min} bps, max {max} bps")]
    InvalidDiscountBounds { min: u16, max: u16 },

    #[error("insufficient payment received: expected {expected}, received {received}")]
    InsufficientPayment { expected: u128, received: u128 },

    #[error("unknown oracle {0}")]
    UnknownOracle(String),

    #[error("unknown ledger {0}")]
    UnknownLedger(String),

    #[error("buyback callback failed: {0}")]
    CallbackFailed(String),

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("pricing error: {0}")]
    Pricing(#[from] PricingError),
}

/// Demand-capped, oracle-priced buyback engine.
///
/// One instance per deployment. The engine never holds a price, only the
/// discount applied to the oracle, and never caches a demand figure. The two
/// deployment variants (custodial treasury vs. self-funded inventory) are a
/// construction-time choice of [`InventorySource`].
///
/// # Example
/// ```
/// use buyback_engine_core_rs::{
///     BuybackEngine, DebtLedger, EngineConfig, InventorySource, MarketState, StaticOracle, Token,
/// };
///
/// let mut payment = Token::new("USDP", 6);
/// payment.mint("LEDGER", 200);
/// let sell = Token::new("WSTK", 18);
/// let mut state = MarketState::new(payment, sell);
/// state.register_oracle("ORACLE", StaticOracle::new(2_000_000_000_000_000_000_000));
/// state.register_ledger("LEDGER", DebtLedger::new(1_000));
///
/// let engine = BuybackEngine::new(EngineConfig {
///     account: "ENGINE".to_string(),
///     owner: "owner".to_string(),
///     admin: "admin".to_string(),
///     oracle_ref: "ORACLE".to_string(),
///     ledger_ref: "LEDGER".to_string(),
///     inventory: InventorySource::SelfFunded,
///     discount_bps: 0,
///     min_admin_discount_bps: 0,
///     max_admin_discount_bps: 100,
///     baseline_buffer: 500,
///     min_admin_baseline: 0,
///     max_admin_baseline: 10_000,
/// })
/// .unwrap();
///
/// assert_eq!(engine.demand_needed(&state).unwrap(), 1_300);
/// ```
#[derive(Debug)]
pub struct BuybackEngine {
    pub(super) account: String,
    pub(super) owner: String,
    pub(super) admin: String,
    pub(super) oracle_ref: String,
    pub(super) ledger_ref: String,
    pub(super) inventory: InventorySource,
    pub(super) discount_bps: u16,
    pub(super) min_admin_discount_bps: u16,
    pub(super) max_admin_discount_bps: u16,
    pub(super) baseline_buffer: u128,
    pub(super) min_admin_baseline: u128,
    pub(super) max_admin_baseline: u128,
    pub(super) paused: bool,
    /// Single-entry lock for the trade protocols.
    pub(super) in_trade: Cell<bool>,
}

impl BuybackEngine {
    /// Validate `config` and build the engine.
    ///
    /// Fails when `discount_bps` exceeds 10000 or the admin discount window
    /// is misordered. The baseline window is taken as supplied.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        if config.discount_bps > MAX_BPS {
            return Err(EngineError::DiscountOutOfRange {
                bps: config.discount_bps,
            });
        }
        if config.min_admin_discount_bps > config.max_admin_discount_bps
            || config.max_admin_discount_bps > MAX_BPS
        {
            return Err(EngineError::InvalidDiscountBounds {
                min: config.min_admin_discount_bps,
                max: config.max_admin_discount_bps,
            });
        }

        Ok(Self {
            account: config.account,
            owner: config.owner,
            admin: config.admin,
            oracle_ref: config.oracle_ref,
            ledger_ref: config.ledger_ref,
            inventory: config.inventory,
            discount_bps: config.discount_bps,
            min_admin_discount_bps: config.min_admin_discount_bps,
            max_admin_discount_bps: config.max_admin_discount_bps,
            baseline_buffer: config.baseline_buffer,
            min_admin_baseline: config.min_admin_baseline,
            max_admin_baseline: config.max_admin_baseline,
            paused: false,
            in_trade: Cell::new(false),
        })
    }

    // ------------------------------------------------------------------
    // Configuration accessors
    // ------------------------------------------------------------------

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn admin(&self) -> &str {
        &self.admin
    }

    pub fn oracle_ref(&self) -> &str {
        &self.oracle_ref
    }

    pub fn ledger_ref(&self) -> &str {
        &self.ledger_ref
    }

    pub fn inventory(&self) -> &InventorySource {
        &self.inventory
    }

    pub fn discount_bps(&self) -> u16 {
        self.discount_bps
    }

    pub fn admin_discount_window(&self) -> (u16, u16) {
        (self.min_admin_discount_bps, self.max_admin_discount_bps)
    }

    pub fn baseline_buffer(&self) -> u128 {
        self.baseline_buffer
    }

    pub fn admin_baseline_window(&self) -> (u128, u128) {
        (self.min_admin_baseline, self.max_admin_baseline)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // ------------------------------------------------------------------
    // Read-side queries (no lock, no caching)
    // ------------------------------------------------------------------

    /// Payment-asset the engine is currently willing to absorb:
    /// `max(0, baseline_buffer + ledger debt - ledger payment balance)`.
    pub fn demand_needed(&self, state: &MarketState) -> Result<u128, EngineError> {
        let ledger = state
            .get_ledger(&self.ledger_ref)
            .ok_or_else(|| EngineError::UnknownLedger(self.ledger_ref.clone()))?;
        let ledger_balance = state.payment_token().balance_of(&self.ledger_ref);
        Ok(demand::shortfall(
            self.baseline_buffer,
            ledger.total_debt(),
            ledger_balance,
        ))
    }

    /// Oracle price after the configured discount.
    pub fn effective_price(&self, state: &MarketState) -> Result<u128, EngineError> {
        let oracle = state
            .get_oracle(&self.oracle_ref)
            .ok_or_else(|| EngineError::UnknownOracle(self.oracle_ref.clone()))?;
        let oracle_price = oracle.price()?;
        Ok(pricing::effective_price(oracle_price, self.discount_bps)?)
    }

    /// Sell-asset paid out for `payment_amount`, at the current effective
    /// price, rounded down.
    pub fn sell_asset_for(
        &self,
        state: &MarketState,
        payment_amount: u128,
    ) -> Result<u128, EngineError> {
        let price = self.effective_price(state)?;
        Ok(pricing::sell_out_for_payment(
            payment_amount,
            price,
            state.payment_token().decimals(),
            state.sell_token().decimals(),
        )?)
    }

    /// Payment-asset owed for `sell_amount`, at the current effective price,
    /// rounded down.
    pub fn payment_asset_for(
        &self,
        state: &MarketState,
        sell_amount: u128,
    ) -> Result<u128, EngineError> {
        let price = self.effective_price(state)?;
        Ok(pricing::payment_in_for_sell(
            sell_amount,
            price,
            state.payment_token().decimals(),
            state.sell_token().decimals(),
        )?)
    }

    /// Sell-asset the configured inventory source can pay out right now.
    pub fn inventory_available(&self, state: &MarketState) -> u128 {
        self.inventory
            .balance_available(&self.account, state.sell_token())
    }
}
