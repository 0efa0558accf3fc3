//! Domain models for the buyback engine

pub mod event;
pub mod ledger;
pub mod oracle;
pub mod state;
pub mod token;

// Re-exports
pub use event::{Event, EventLog};
pub use ledger::DebtLedger;
pub use oracle::{OracleError, PriceOracle, StaticOracle};
pub use state::{MarketState, StateSnapshot};
pub use token::{Token, TokenError};
