//! Trade protocols
//!
//! Two externally triggered settlement paths, both demand-capped and guarded
//! by a single-entry lock held for the whole call:
//!
//! - **pull-then-pay** (`buy`): payment is pulled from the caller first, then
//!   sell-asset is paid out. Every failure is checked before funds move, so a
//!   failed call has no effect.
//! - **push-with-callback-then-verify** (`buy_with_callback`): sell-asset is
//!   fronted to the recipient, its callback runs arbitrary foreign logic, and
//!   the ledger's payment balance is compared before/after. A shortfall rolls
//!   the monetary state back wholesale.
//!
//! The lock spans the callback. A callback that re-invokes either protocol
//! fails with `ReentrantCall`; it can never interleave with the in-flight
//! settlement or duplicate a payout.

use std::cell::Cell;

use thiserror::Error;
use uuid::Uuid;

use crate::models::event::Event;
use crate::models::state::MarketState;

use super::engine::{BuybackEngine, EngineError};

/// Error surfaced by a recipient callback.
#[derive(Debug, Error, PartialEq)]
#[error("{0}")]
pub struct CallbackError(pub String);

/// Recipient-side hook for the push-with-callback protocol.
///
/// Invoked after the sell-asset has been fronted; expected to cause
/// `payment_due` payment-asset to arrive at the engine's debt ledger before
/// returning. The callee may inspect the engine and move funds through the
/// market state; re-invoking a trade protocol is rejected.
pub trait BuybackCallee {
    fn on_buyback(
        &mut self,
        engine: &BuybackEngine,
        state: &mut MarketState,
        initiator: &str,
        payment_due: u128,
        data: &[u8],
    ) -> Result<(), CallbackError>;
}

/// Outcome of a completed trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeReceipt {
    pub trade_id: String,
    /// Account the sell-asset was paid to
    pub recipient: String,
    /// Payment-asset forwarded to the debt ledger
    pub payment_in: u128,
    pub sell_out: u128,
}

/// Single-entry lock over the trade protocols.
///
/// Acquired on entry, released by `Drop` on every exit path. A second
/// acquisition while one is live fails without touching the flag.
struct TradeGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> TradeGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Result<Self, EngineError> {
        if flag.replace(true) {
            Err(EngineError::ReentrantCall)
        } else {
            Ok(Self { flag })
        }
    }
}

impl Drop for TradeGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

impl BuybackEngine {
    /// Pull-then-pay: absorb up to `requested` payment-asset from `caller`
    /// and pay the equivalent sell-asset back at the effective price.
    ///
    /// The request is capped at `demand_needed` read at call time. The
    /// payment leg uses the caller's allowance to the engine; an
    /// insufficient balance or allowance aborts the whole call.
    pub fn buy(
        &self,
        state: &mut MarketState,
        caller: &str,
        requested: u128,
    ) -> Result<TradeReceipt, EngineError> {
        let _guard = TradeGuard::acquire(&self.in_trade)?;
        if self.paused {
            return Err(EngineError::Paused);
        }

        let amount = requested.min(self.demand_needed(state)?);
        let sell_out = self.sell_asset_for(state, amount)?;

        // Both legs are validated before either runs; after this point
        // nothing can fail.
        self.inventory
            .ensure_available(&self.account, state.sell_token(), sell_out)?;
        state
            .payment_token_mut()
            .transfer_from(&self.account, caller, &self.ledger_ref, amount)?;

        state
            .get_ledger_mut(&self.ledger_ref)
            .ok_or_else(|| EngineError::UnknownLedger(self.ledger_ref.clone()))?
            .repay(amount);
        self.inventory
            .transfer_out(&self.account, state.sell_token_mut(), caller, sell_out)?;

        let receipt = TradeReceipt {
            trade_id: Uuid::new_v4().to_string(),
            recipient: caller.to_string(),
            payment_in: amount,
            sell_out,
        };
        state.events_mut().log(Event::TradeCompleted {
            trade_id: receipt.trade_id.clone(),
            recipient: receipt.recipient.clone(),
            sell_out,
            payment_in: amount,
        });
        Ok(receipt)
    }

    /// Push-with-callback-then-verify: front sell-asset to `to`, run the
    /// recipient's callback, and verify the ledger's payment balance grew by
    /// at least the quoted amount.
    ///
    /// `to` may differ from `caller`, letting the recipient resell the
    /// fronted sell-asset to produce the payment. The repayment forwarded to
    /// the ledger is the balance increase actually observed, so an
    /// over-delivering callback repays more than quoted; a short delivery
    /// fails with `InsufficientPayment` and restores the pre-trade state.
    pub fn buy_with_callback(
        &self,
        state: &mut MarketState,
        caller: &str,
        requested: u128,
        to: &str,
        callee: &mut dyn BuybackCallee,
        data: &[u8],
    ) -> Result<TradeReceipt, EngineError> {
        let _guard = TradeGuard::acquire(&self.in_trade)?;
        if self.paused {
            return Err(EngineError::Paused);
        }

        let amount = requested.min(self.demand_needed(state)?);
        let before = state.payment_token().balance_of(&self.ledger_ref);
        let sell_out = self.sell_asset_for(state, amount)?;
        self.inventory
            .ensure_available(&self.account, state.sell_token(), sell_out)?;

        let snapshot = state.snapshot();
        self.inventory
            .transfer_out(&self.account, state.sell_token_mut(), to, sell_out)?;

        if let Err(err) = callee.on_buyback(self, state, caller, amount, data) {
            state.restore(snapshot);
            return Err(EngineError::CallbackFailed(err.to_string()));
        }

        let after = state.payment_token().balance_of(&self.ledger_ref);
        let received = after.saturating_sub(before);
        if received < amount {
            state.restore(snapshot);
            return Err(EngineError::InsufficientPayment {
                expected: amount,
                received,
            });
        }

        state
            .get_ledger_mut(&self.ledger_ref)
            .ok_or_else(|| EngineError::UnknownLedger(self.ledger_ref.clone()))?
            .repay(received);

        let receipt = TradeReceipt {
            trade_id: Uuid::new_v4().to_string(),
            recipient: to.to_string(),
            payment_in: received,
            sell_out,
        };
        state.events_mut().log(Event::TradeCompleted {
            trade_id: receipt.trade_id.clone(),
            recipient: receipt.recipient.clone(),
            sell_out,
            payment_in: received,
        });
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_blocks_second_acquisition() {
        let flag = Cell::new(false);
        let first = TradeGuard::acquire(&flag).unwrap();
        assert_eq!(
            TradeGuard::acquire(&flag).err(),
            Some(EngineError::ReentrantCall)
        );
        drop(first);
        assert!(TradeGuard::acquire(&flag).is_ok());
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let flag = Cell::new(false);
        {
            let _guard = TradeGuard::acquire(&flag).unwrap();
            assert!(flag.get());
        }
        assert!(!flag.get());
    }

    #[test]
    fn test_failed_acquisition_leaves_lock_held() {
        let flag = Cell::new(false);
        let _outer = TradeGuard::acquire(&flag).unwrap();
        let _ = TradeGuard::acquire(&flag);
        assert!(flag.get(), "inner failure must not release the outer lock");
    }
}
