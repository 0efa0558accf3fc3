//! Buyback Engine Core - Rust Engine
//!
//! Oracle-priced buyback engine that continuously acquires a payment asset
//! with a sell asset, capped by the shortfall reported through an external
//! debt ledger.
//!
//! # Architecture
//!
//! - **math**: Wide-integer helpers for exact conversion arithmetic
//! - **models**: Domain types (Token, DebtLedger, PriceOracle, MarketState)
//! - **pricing**: Effective price and payment/sell conversions
//! - **demand**: Demand-cap computation
//! - **settlement**: The engine itself (trade protocols, governance)
//!
//! # Critical Invariants
//!
//! 1. All money values are u128 in each asset's smallest native unit
//! 2. Oracle prices are u128 scaled by 10^18
//! 3. Conversions round down; the engine never overpays sell-asset
//! 4. A trade either completes fully or leaves no effect behind

// Module declarations
pub mod demand;
pub mod math;
pub mod models;
pub mod pricing;
pub mod settlement;

// Re-exports for convenience
pub use models::{
    event::{Event, EventLog},
    ledger::DebtLedger,
    oracle::{OracleError, PriceOracle, StaticOracle},
    state::{MarketState, StateSnapshot},
    token::{Token, TokenError},
};
pub use pricing::{PricingError, MAX_BPS, PRICE_DECIMALS};
pub use settlement::{
    BuybackCallee, BuybackEngine, CallbackError, EngineConfig, EngineError, InventorySource,
    TradeReceipt,
};
