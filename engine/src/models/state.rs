//! Host environment state
//!
//! `MarketState` plays the role of the host platform: it owns the payment and
//! sell tokens, the registries that resolve the engine's `oracle_ref` /
//! `ledger_ref` indirections, and the event log. Engine operations borrow it
//! mutably for their full duration, which is what makes each operation a
//! single atomic unit of work.
//!
//! # Snapshots
//!
//! The push-with-callback trade protocol fronts sell-asset before payment is
//! verified. `snapshot`/`restore` give that protocol its all-or-nothing
//! semantics: on a failed verification the monetary state (tokens, ledgers,
//! event-log length) is restored wholesale. Oracles are not snapshotted; they
//! are never written during a trade.

use std::collections::HashMap;

use crate::models::event::EventLog;
use crate::models::ledger::DebtLedger;
use crate::models::oracle::PriceOracle;
use crate::models::token::Token;

/// Everything outside the engine that a trade can touch.
#[derive(Debug)]
pub struct MarketState {
    payment: Token,
    sell: Token,
    oracles: HashMap<String, Box<dyn PriceOracle>>,
    ledgers: HashMap<String, DebtLedger>,
    events: EventLog,
}

impl MarketState {
    pub fn new(payment: Token, sell: Token) -> Self {
        Self {
            payment,
            sell,
            oracles: HashMap::new(),
            ledgers: HashMap::new(),
            events: EventLog::new(),
        }
    }

    pub fn payment_token(&self) -> &Token {
        &self.payment
    }

    pub fn payment_token_mut(&mut self) -> &mut Token {
        &mut self.payment
    }

    pub fn sell_token(&self) -> &Token {
        &self.sell
    }

    pub fn sell_token_mut(&mut self) -> &mut Token {
        &mut self.sell
    }

    /// Register (or replace) the oracle reachable under `id`.
    pub fn register_oracle(&mut self, id: impl Into<String>, oracle: impl PriceOracle + 'static) {
        self.oracles.insert(id.into(), Box::new(oracle));
    }

    pub fn get_oracle(&self, id: &str) -> Option<&dyn PriceOracle> {
        self.oracles.get(id).map(|oracle| oracle.as_ref())
    }

    /// Register (or replace) the debt ledger reachable under `id`.
    pub fn register_ledger(&mut self, id: impl Into<String>, ledger: DebtLedger) {
        self.ledgers.insert(id.into(), ledger);
    }

    pub fn get_ledger(&self, id: &str) -> Option<&DebtLedger> {
        self.ledgers.get(id)
    }

    pub fn get_ledger_mut(&mut self, id: &str) -> Option<&mut DebtLedger> {
        self.ledgers.get_mut(id)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    /// Capture the monetary state for a later `restore`.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            payment: self.payment.clone(),
            sell: self.sell.clone(),
            ledgers: self.ledgers.clone(),
            event_count: self.events.len(),
        }
    }

    /// Roll the monetary state back to `snapshot`.
    pub fn restore(&mut self, snapshot: StateSnapshot) {
        self.payment = snapshot.payment;
        self.sell = snapshot.sell;
        self.ledgers = snapshot.ledgers;
        self.events.truncate(snapshot.event_count);
    }
}

/// Copy of the monetary state taken before an optimistic settlement.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    payment: Token,
    sell: Token,
    ledgers: HashMap<String, DebtLedger>,
    event_count: usize,
}
