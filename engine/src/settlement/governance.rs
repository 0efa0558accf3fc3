//! Governance surface
//!
//! Two roles mutate the engine's parameters. The owner is unconstrained; the
//! admin is additionally held inside owner-configured min/max windows for the
//! two economic parameters (discount, baseline buffer). Every write appends
//! an old/new event; a rejected write changes nothing and is not retried.
//!
//! Authorization is one policy evaluated before each write: required role,
//! plus an optional window check applied only to non-owner callers.

use crate::models::event::Event;
use crate::models::state::MarketState;
use crate::pricing::MAX_BPS;

use super::engine::{BuybackEngine, EngineError};

/// Window applied to admin writes of a bounded parameter.
struct BoundCheck {
    value: u128,
    min: u128,
    max: u128,
}

impl BuybackEngine {
    /// Owner passes unconditionally; the admin passes when the optional
    /// window admits the value; everyone else is rejected.
    fn authorize(&self, caller: &str, bounds: Option<BoundCheck>) -> Result<(), EngineError> {
        if caller == self.owner {
            return Ok(());
        }
        if caller == self.admin {
            if let Some(check) = bounds {
                if check.value < check.min || check.value > check.max {
                    return Err(EngineError::OutsideAdminWindow {
                        value: check.value,
                        min: check.min,
                        max: check.max,
                    });
                }
            }
            return Ok(());
        }
        Err(EngineError::Unauthorized {
            caller: caller.to_string(),
        })
    }

    fn require_owner(&self, caller: &str) -> Result<(), EngineError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(EngineError::NotOwner {
                caller: caller.to_string(),
            })
        }
    }

    // ------------------------------------------------------------------
    // Bounded economic parameters (owner or windowed admin)
    // ------------------------------------------------------------------

    /// Set the discount off the oracle price.
    ///
    /// Rejected above 10000 bps for every caller; admin callers must also
    /// stay inside the admin discount window.
    pub fn set_discount_bps(
        &mut self,
        state: &mut MarketState,
        caller: &str,
        bps: u16,
    ) -> Result<(), EngineError> {
        if bps > MAX_BPS {
            return Err(EngineError::DiscountOutOfRange { bps });
        }
        self.authorize(
            caller,
            Some(BoundCheck {
                value: bps.into(),
                min: self.min_admin_discount_bps.into(),
                max: self.max_admin_discount_bps.into(),
            }),
        )?;
        let old = self.discount_bps;
        self.discount_bps = bps;
        state.events_mut().log(Event::DiscountUpdated { old, new: bps });
        Ok(())
    }

    /// Set the payment-asset reserve target; admin callers must stay inside
    /// the admin baseline window.
    pub fn set_baseline_buffer(
        &mut self,
        state: &mut MarketState,
        caller: &str,
        amount: u128,
    ) -> Result<(), EngineError> {
        self.authorize(
            caller,
            Some(BoundCheck {
                value: amount,
                min: self.min_admin_baseline,
                max: self.max_admin_baseline,
            }),
        )?;
        let old = self.baseline_buffer;
        self.baseline_buffer = amount;
        state
            .events_mut()
            .log(Event::BaselineBufferUpdated { old, new: amount });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Role rotation
    // ------------------------------------------------------------------

    /// Rotate the admin role; available to owner and admin alike.
    pub fn set_admin(
        &mut self,
        state: &mut MarketState,
        caller: &str,
        new_admin: &str,
    ) -> Result<(), EngineError> {
        self.authorize(caller, None)?;
        let old = std::mem::replace(&mut self.admin, new_admin.to_string());
        state.events_mut().log(Event::AdminUpdated {
            old,
            new: new_admin.to_string(),
        });
        Ok(())
    }

    /// Hand ownership to `new_owner`.
    pub fn transfer_ownership(
        &mut self,
        state: &mut MarketState,
        caller: &str,
        new_owner: &str,
    ) -> Result<(), EngineError> {
        self.require_owner(caller)?;
        let old = std::mem::replace(&mut self.owner, new_owner.to_string());
        state.events_mut().log(Event::OwnerUpdated {
            old,
            new: new_owner.to_string(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Collaborator wiring (owner only)
    // ------------------------------------------------------------------

    pub fn set_oracle_ref(
        &mut self,
        state: &mut MarketState,
        caller: &str,
        oracle_ref: &str,
    ) -> Result<(), EngineError> {
        self.require_owner(caller)?;
        let old = std::mem::replace(&mut self.oracle_ref, oracle_ref.to_string());
        state.events_mut().log(Event::OracleUpdated {
            old,
            new: oracle_ref.to_string(),
        });
        Ok(())
    }

    pub fn set_ledger_ref(
        &mut self,
        state: &mut MarketState,
        caller: &str,
        ledger_ref: &str,
    ) -> Result<(), EngineError> {
        self.require_owner(caller)?;
        let old = std::mem::replace(&mut self.ledger_ref, ledger_ref.to_string());
        state.events_mut().log(Event::LedgerUpdated {
            old,
            new: ledger_ref.to_string(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Admin windows (owner only)
    // ------------------------------------------------------------------
    //
    // Each edge is set independently and is not cross-checked against the
    // other; admin writes validate against the window exactly as configured.

    pub fn set_min_admin_discount_bps(
        &mut self,
        state: &mut MarketState,
        caller: &str,
        bps: u16,
    ) -> Result<(), EngineError> {
        self.require_owner(caller)?;
        let old = std::mem::replace(&mut self.min_admin_discount_bps, bps);
        state
            .events_mut()
            .log(Event::AdminDiscountMinUpdated { old, new: bps });
        Ok(())
    }

    pub fn set_max_admin_discount_bps(
        &mut self,
        state: &mut MarketState,
        caller: &str,
        bps: u16,
    ) -> Result<(), EngineError> {
        self.require_owner(caller)?;
        let old = std::mem::replace(&mut self.max_admin_discount_bps, bps);
        state
            .events_mut()
            .log(Event::AdminDiscountMaxUpdated { old, new: bps });
        Ok(())
    }

    pub fn set_min_admin_baseline(
        &mut self,
        state: &mut MarketState,
        caller: &str,
        amount: u128,
    ) -> Result<(), EngineError> {
        self.require_owner(caller)?;
        let old = std::mem::replace(&mut self.min_admin_baseline, amount);
        state
            .events_mut()
            .log(Event::AdminBaselineMinUpdated { old, new: amount });
        Ok(())
    }

    pub fn set_max_admin_baseline(
        &mut self,
        state: &mut MarketState,
        caller: &str,
        amount: u128,
    ) -> Result<(), EngineError> {
        self.require_owner(caller)?;
        let old = std::mem::replace(&mut self.max_admin_baseline, amount);
        state
            .events_mut()
            .log(Event::AdminBaselineMaxUpdated { old, new: amount });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Circuit breaker (owner or admin)
    // ------------------------------------------------------------------

    /// Halt the trade protocols. Reads and governance stay available.
    pub fn pause(&mut self, state: &mut MarketState, caller: &str) -> Result<(), EngineError> {
        self.authorize(caller, None)?;
        self.paused = true;
        state.events_mut().log(Event::Paused);
        Ok(())
    }

    /// Resume the trade protocols.
    pub fn unpause(&mut self, state: &mut MarketState, caller: &str) -> Result<(), EngineError> {
        self.authorize(caller, None)?;
        self.paused = false;
        state.events_mut().log(Event::Unpaused);
        Ok(())
    }
}
