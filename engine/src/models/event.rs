//! Event logging for auditing and off-chain observers.
//!
//! Every completed trade and every configuration mutation appends an event.
//! Parameter changes carry both the old and the new value so an observer can
//! reconstruct the configuration history from the log alone.

/// Engine event capturing a state change.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A trade completed and payment was forwarded to the debt ledger
    TradeCompleted {
        trade_id: String,
        /// Account that received the sell-asset
        recipient: String,
        sell_out: u128,
        payment_in: u128,
    },

    /// Discount applied to the oracle price changed
    DiscountUpdated { old: u16, new: u16 },

    /// Minimum payment-asset reserve target changed
    BaselineBufferUpdated { old: u128, new: u128 },

    /// Engine repointed at a different price oracle
    OracleUpdated { old: String, new: String },

    /// Engine repointed at a different debt ledger
    LedgerUpdated { old: String, new: String },

    /// Admin role moved to a new account
    AdminUpdated { old: String, new: String },

    /// Ownership transferred
    OwnerUpdated { old: String, new: String },

    /// Lower edge of the admin discount window changed
    AdminDiscountMinUpdated { old: u16, new: u16 },

    /// Upper edge of the admin discount window changed
    AdminDiscountMaxUpdated { old: u16, new: u16 },

    /// Lower edge of the admin baseline window changed
    AdminBaselineMinUpdated { old: u128, new: u128 },

    /// Upper edge of the admin baseline window changed
    AdminBaselineMaxUpdated { old: u128, new: u128 },

    /// Trading halted
    Paused,

    /// Trading resumed
    Unpaused,
}

impl Event {
    /// Short type tag for filtering.
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::TradeCompleted { .. } => "trade_completed",
            Event::DiscountUpdated { .. } => "discount_updated",
            Event::BaselineBufferUpdated { .. } => "baseline_buffer_updated",
            Event::OracleUpdated { .. } => "oracle_updated",
            Event::LedgerUpdated { .. } => "ledger_updated",
            Event::AdminUpdated { .. } => "admin_updated",
            Event::OwnerUpdated { .. } => "owner_updated",
            Event::AdminDiscountMinUpdated { .. } => "admin_discount_min_updated",
            Event::AdminDiscountMaxUpdated { .. } => "admin_discount_max_updated",
            Event::AdminBaselineMinUpdated { .. } => "admin_baseline_min_updated",
            Event::AdminBaselineMaxUpdated { .. } => "admin_baseline_max_updated",
            Event::Paused => "paused",
            Event::Unpaused => "unpaused",
        }
    }
}

/// Append-only event log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event.
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events in order of occurrence.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events matching a type tag.
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Drop every event past `len`; used when a settlement is rolled back.
    pub fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
