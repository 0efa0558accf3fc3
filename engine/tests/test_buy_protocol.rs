//! Pull-then-pay protocol tests
//!
//! Covers the demand cap, effective-price settlement, atomicity of failed
//! calls, the pause circuit breaker, and both inventory sources.

use buyback_engine_core_rs::{
    BuybackEngine, DebtLedger, EngineConfig, EngineError, InventorySource, MarketState,
    OracleError, PriceOracle, PricingError, StaticOracle, Token, TokenError,
};

/// 2000.0 payment per sell, scaled 1e18
const PRICE_2000: u128 = 2_000_000_000_000_000_000_000;

/// 1000.0 sell-asset units (18 decimals)
const TREASURY_INVENTORY: u128 = 1_000_000_000_000_000_000_000;

fn test_config(baseline: u128, discount_bps: u16) -> EngineConfig {
    EngineConfig {
        account: "ENGINE".to_string(),
        owner: "owner".to_string(),
        admin: "admin".to_string(),
        oracle_ref: "ORACLE".to_string(),
        ledger_ref: "LEDGER".to_string(),
        inventory: InventorySource::Treasury {
            account: "TREASURY".to_string(),
        },
        discount_bps,
        min_admin_discount_bps: 0,
        max_admin_discount_bps: 1_000,
        baseline_buffer: baseline,
        min_admin_baseline: 0,
        max_admin_baseline: u128::MAX,
    }
}

/// World with a funded caller, an approved treasury, and a ledger in debt.
fn setup(
    debt: u128,
    ledger_balance: u128,
    baseline: u128,
    discount_bps: u16,
) -> (BuybackEngine, MarketState) {
    let mut payment = Token::new("USDP", 6);
    payment.mint("alice", 10_000_000_000); // 10,000.000000
    payment.mint("LEDGER", ledger_balance);
    payment.approve("alice", "ENGINE", u128::MAX);

    let mut sell = Token::new("WSTK", 18);
    sell.mint("TREASURY", TREASURY_INVENTORY);
    sell.approve("TREASURY", "ENGINE", u128::MAX);

    let mut state = MarketState::new(payment, sell);
    state.register_oracle("ORACLE", StaticOracle::new(PRICE_2000));
    state.register_ledger("LEDGER", DebtLedger::new(debt));

    let engine = BuybackEngine::new(test_config(baseline, discount_bps)).unwrap();
    (engine, state)
}

#[test]
fn test_buy_settles_at_oracle_price() {
    let (engine, mut state) = setup(5_000_000_000, 0, 0, 0);

    // 1000.000000 payment at 2000.0 buys 0.5 sell
    let receipt = engine.buy(&mut state, "alice", 1_000_000_000).unwrap();

    assert_eq!(receipt.payment_in, 1_000_000_000);
    assert_eq!(receipt.sell_out, 500_000_000_000_000_000);
    assert_eq!(receipt.recipient, "alice");
    assert_eq!(receipt.trade_id.len(), 36);

    assert_eq!(state.payment_token().balance_of("alice"), 9_000_000_000);
    assert_eq!(state.payment_token().balance_of("LEDGER"), 1_000_000_000);
    assert_eq!(
        state.sell_token().balance_of("alice"),
        500_000_000_000_000_000
    );
    assert_eq!(
        state.sell_token().balance_of("TREASURY"),
        TREASURY_INVENTORY - 500_000_000_000_000_000
    );

    let ledger = state.get_ledger("LEDGER").unwrap();
    assert_eq!(ledger.total_debt(), 4_000_000_000);
    assert_eq!(ledger.total_repaid(), 1_000_000_000);

    assert_eq!(state.events().events_of_type("trade_completed").len(), 1);
}

#[test]
fn test_buy_moves_exactly_demand_when_over_requested() {
    // debt 1.000000, balance 0.200000, baseline 0.500000 -> shortfall 1.300000
    let (engine, mut state) = setup(1_000_000, 200_000, 500_000, 0);
    assert_eq!(engine.demand_needed(&state).unwrap(), 1_300_000);

    let receipt = engine.buy(&mut state, "alice", 5_000_000).unwrap();
    assert_eq!(receipt.payment_in, 1_300_000);

    // Ledger is now flush: debt cleared, buffer restored.
    assert_eq!(engine.demand_needed(&state).unwrap(), 0);
    assert_eq!(state.payment_token().balance_of("LEDGER"), 1_500_000);

    // A second trade absorbs nothing.
    let receipt = engine.buy(&mut state, "alice", 5_000_000).unwrap();
    assert_eq!(receipt.payment_in, 0);
    assert_eq!(receipt.sell_out, 0);
}

#[test]
fn test_buy_applies_discount() {
    let (engine, mut state) = setup(5_000_000_000, 0, 0, 250);

    // Effective price 1950.0; 1950.000000 payment buys exactly 1.0 sell.
    assert_eq!(
        engine.effective_price(&state).unwrap(),
        1_950_000_000_000_000_000_000
    );
    let receipt = engine.buy(&mut state, "alice", 1_950_000_000).unwrap();
    assert_eq!(receipt.sell_out, 1_000_000_000_000_000_000);
}

#[test]
fn test_buy_insufficient_allowance_leaves_no_trace() {
    let (engine, mut state) = setup(5_000_000_000, 0, 0, 0);
    state.payment_token_mut().approve("alice", "ENGINE", 100);

    let result = engine.buy(&mut state, "alice", 1_000_000_000);
    assert_eq!(
        result,
        Err(EngineError::Token(TokenError::InsufficientAllowance {
            required: 1_000_000_000,
            available: 100,
        }))
    );

    assert_eq!(state.payment_token().balance_of("alice"), 10_000_000_000);
    assert_eq!(state.payment_token().balance_of("LEDGER"), 0);
    assert_eq!(state.sell_token().balance_of("TREASURY"), TREASURY_INVENTORY);
    assert_eq!(state.get_ledger("LEDGER").unwrap().total_repaid(), 0);
    assert!(state.events().is_empty());
}

#[test]
fn test_buy_insufficient_inventory_leaves_no_trace() {
    let (engine, mut state) = setup(5_000_000_000, 0, 0, 0);
    state.sell_token_mut().approve("TREASURY", "ENGINE", 1);

    let result = engine.buy(&mut state, "alice", 1_000_000_000);
    assert!(matches!(
        result,
        Err(EngineError::Token(TokenError::InsufficientAllowance { .. }))
    ));

    // The payment leg never ran.
    assert_eq!(state.payment_token().balance_of("alice"), 10_000_000_000);
    assert_eq!(state.payment_token().balance_of("LEDGER"), 0);
    assert!(state.events().is_empty());
}

#[test]
fn test_buy_rejected_while_paused_reads_still_served() {
    let (mut engine, mut state) = setup(5_000_000_000, 0, 0, 0);
    engine.pause(&mut state, "owner").unwrap();

    assert_eq!(
        engine.buy(&mut state, "alice", 1_000_000_000),
        Err(EngineError::Paused)
    );

    // Read-only queries ignore the pause.
    assert_eq!(engine.demand_needed(&state).unwrap(), 5_000_000_000);
    assert_eq!(engine.effective_price(&state).unwrap(), PRICE_2000);
    assert!(engine.sell_asset_for(&state, 1_000_000).is_ok());

    engine.unpause(&mut state, "owner").unwrap();
    assert!(engine.buy(&mut state, "alice", 1_000_000_000).is_ok());
}

#[test]
fn test_buy_from_own_balance() {
    let mut payment = Token::new("USDP", 6);
    payment.mint("alice", 2_000_000_000);
    payment.approve("alice", "ENGINE", u128::MAX);

    let mut sell = Token::new("WSTK", 18);
    sell.mint("ENGINE", 3_000_000_000_000_000_000); // 3.0 held by the engine

    let mut state = MarketState::new(payment, sell);
    state.register_oracle("ORACLE", StaticOracle::new(PRICE_2000));
    state.register_ledger("LEDGER", DebtLedger::new(5_000_000_000));

    let mut config = test_config(0, 0);
    config.inventory = InventorySource::SelfFunded;
    let engine = BuybackEngine::new(config).unwrap();

    let receipt = engine.buy(&mut state, "alice", 2_000_000_000).unwrap();
    assert_eq!(receipt.sell_out, 1_000_000_000_000_000_000);
    assert_eq!(
        state.sell_token().balance_of("ENGINE"),
        2_000_000_000_000_000_000
    );
    assert_eq!(
        state.sell_token().balance_of("alice"),
        1_000_000_000_000_000_000
    );
}

#[test]
fn test_buy_zero_oracle_price_is_fatal() {
    let (engine, mut state) = setup(5_000_000_000, 0, 0, 0);
    state.register_oracle("ORACLE", StaticOracle::new(0));

    assert_eq!(
        engine.buy(&mut state, "alice", 1_000_000_000),
        Err(EngineError::Pricing(PricingError::ZeroPrice))
    );
    assert_eq!(state.payment_token().balance_of("alice"), 10_000_000_000);
}

#[test]
fn test_buy_full_discount_is_fatal() {
    let (mut engine, mut state) = setup(5_000_000_000, 0, 0, 0);
    engine.set_discount_bps(&mut state, "owner", 10_000).unwrap();

    assert_eq!(engine.effective_price(&state).unwrap(), 0);
    assert_eq!(
        engine.buy(&mut state, "alice", 1_000_000_000),
        Err(EngineError::Pricing(PricingError::ZeroPrice))
    );
}

#[test]
fn test_buy_oracle_read_failure_aborts() {
    #[derive(Debug)]
    struct OfflineOracle;

    impl PriceOracle for OfflineOracle {
        fn price(&self) -> Result<u128, OracleError> {
            Err(OracleError::Unavailable("feed down".to_string()))
        }
    }

    let (engine, mut state) = setup(5_000_000_000, 0, 0, 0);
    state.register_oracle("ORACLE", OfflineOracle);

    assert!(matches!(
        engine.buy(&mut state, "alice", 1_000_000_000),
        Err(EngineError::Oracle(OracleError::Unavailable(_)))
    ));
    assert_eq!(state.payment_token().balance_of("alice"), 10_000_000_000);
    assert!(state.events().is_empty());
}

#[test]
fn test_buy_consumes_caller_allowance() {
    let (engine, mut state) = setup(5_000_000_000, 0, 0, 0);
    state
        .payment_token_mut()
        .approve("alice", "ENGINE", 1_000_000_000);

    engine.buy(&mut state, "alice", 600_000_000).unwrap();
    assert_eq!(
        state.payment_token().allowance("alice", "ENGINE"),
        400_000_000
    );
}
