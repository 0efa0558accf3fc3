//! Settlement Module
//!
//! The buyback engine: demand-capped, oracle-priced trades settled through
//! one of two protocols, plus the dual-role governance surface that tunes the
//! pricing parameters.
//!
//! # Critical Invariants
//!
//! 1. **Atomicity**: a trade either completes fully or leaves no effect
//! 2. **Demand cap**: no trade absorbs more payment-asset than the current
//!    ledger shortfall
//! 3. **Single entry**: at most one trade is in flight per engine instance;
//!    reentrant invocation through a callback fails outright
//! 4. **Bounded discount**: `discount_bps` never exceeds 10000, and admin
//!    writers stay inside the owner-configured window

pub mod config;
pub mod engine;
pub mod governance;
pub mod trade;

// Re-export public API
pub use config::{EngineConfig, InventorySource};
pub use engine::{BuybackEngine, EngineError};
pub use trade::{BuybackCallee, CallbackError, TradeReceipt};
