//! Property tests for the curve formulas and for trade sequences executed
//! through the registry.

mod common;

use common::{wad, Fixture};
use launchpad_core::curve::{quote_buy, quote_sell, spot_price};
use launchpad_core::{LaunchpadError, Reserves, Treasury, U256};
use proptest::prelude::*;

// ============================================================================
// Test Strategies
// ============================================================================

/// Supplies from 1e9 to 1e11 whole units: never short of asset liquidity
fn large_supply() -> impl Strategy<Value = U256> {
    (1_000_000_000u128..100_000_000_000).prop_map(wad)
}

/// Collateral amounts from 1e6 base units to 1e6 whole units
fn collateral() -> impl Strategy<Value = U256> {
    (1_000_000u128..1_000_000_000_000_000_000_000_000).prop_map(U256::new)
}

/// Sizable collateral amounts, at least 1e15 base units
fn sizable_collateral() -> impl Strategy<Value = U256> {
    (1_000_000_000_000_000u128..1_000_000_000_000_000_000_000_000).prop_map(U256::new)
}

#[derive(Debug, Clone)]
enum Step {
    Buy { trader: usize, units: u128 },
    Sell { trader: usize, fraction_bps: u128 },
}

fn trade_steps() -> impl Strategy<Value = Vec<Step>> {
    let step = prop_oneof![
        (0usize..3, 1u128..50_000).prop_map(|(trader, units)| Step::Buy { trader, units }),
        (0usize..3, 1u128..=10_000).prop_map(|(trader, fraction_bps)| Step::Sell { trader, fraction_bps }),
    ];
    prop::collection::vec(step, 1..25)
}

// ============================================================================
// Curve Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_buy_moves_exact_token_amount(supply in large_supply(), x in collateral()) {
        let reserves = Reserves::initial(supply);
        let quote = quote_buy(&reserves, x).unwrap();

        prop_assert!(quote.tokens > U256::ZERO);
        prop_assert_eq!(quote.reserves_after.real_asset, reserves.real_asset - quote.tokens);
        prop_assert_eq!(quote.reserves_after.virtual_asset, reserves.virtual_asset - quote.tokens);
        prop_assert_eq!(quote.reserves_after.real_collateral, quote.fees.net);
        prop_assert_eq!(
            quote.fees.net + quote.fees.trading_fee + quote.fees.protocol_fee,
            x
        );
    }

    #[test]
    fn prop_price_rises_on_buy_and_falls_on_sell(
        supply in large_supply(),
        x in sizable_collateral(),
        sell_fraction in 1u128..=100,
    ) {
        let reserves = Reserves::initial(supply);
        let price_before = spot_price(&reserves).unwrap();
        let buy = quote_buy(&reserves, x).unwrap();
        prop_assert!(buy.price_after > price_before);

        let tokens = buy.tokens * U256::new(sell_fraction) / U256::new(100);
        prop_assume!(tokens > U256::ZERO);
        match quote_sell(&buy.reserves_after, tokens) {
            Ok(sell) => prop_assert!(sell.price_after < buy.price_after),
            Err(e) => prop_assert!(matches!(e, LaunchpadError::InsufficientLiquidity { .. }), "unexpected error: {:?}", e),
        }
    }

    #[test]
    fn prop_quoted_round_trip_nets_less_than_input(
        supply in large_supply(),
        prior in 0u128..1_000_000,
        x in collateral(),
    ) {
        let mut reserves = Reserves::initial(supply);
        if prior > 0 {
            reserves = quote_buy(&reserves, wad(prior)).unwrap().reserves_after;
        }
        let buy = quote_buy(&reserves, x).unwrap();
        // Lend the pool enough collateral that liquidity never binds
        let funded = Reserves {
            real_collateral: buy.reserves_after.real_collateral + x + x,
            ..buy.reserves_after
        };
        let sell = quote_sell(&funded, buy.tokens).unwrap();
        prop_assert!(sell.fees.net < x);
    }

    #[test]
    fn prop_invariant_never_grows(supply in large_supply(), x in collateral()) {
        let reserves = Reserves::initial(supply);
        let k0 = reserves.invariant().unwrap();
        let buy = quote_buy(&reserves, x).unwrap();
        let k1 = buy.reserves_after.invariant().unwrap();
        prop_assert!(k1 <= k0);
        prop_assert!(k0 - k1 < buy.reserves_after.virtual_collateral);
    }
}

// ============================================================================
// Executed Sequences
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_conservation_over_trade_sequences(steps in trade_steps()) {
        let fixture = Fixture::new();
        let supply = wad(1_000_000_000);
        let market_id = fixture.market(supply);
        let traders: Vec<_> = (0..3)
            .map(|i| {
                let trader = fixture.fund(&format!("trader-{}", i), wad(10_000_000));
                fixture.approve_market(market_id, &trader);
                trader
            })
            .collect();

        for step in steps {
            let result = match step {
                Step::Buy { trader, units } => {
                    fixture.registry.buy(market_id, wad(units), &traders[trader]).map(|_| ())
                }
                Step::Sell { trader, fraction_bps } => {
                    let held = fixture.registry.asset_balance(market_id, &traders[trader]).unwrap();
                    let amount = held * U256::new(fraction_bps) / U256::new(10_000);
                    fixture.registry.sell(market_id, amount, &traders[trader]).map(|_| ())
                }
            };
            if let Err(e) = result {
                prop_assert!(
                    e.category().is_retryable() || e == LaunchpadError::ZeroInput
                        || matches!(e, LaunchpadError::MarketInactive(_)),
                    "unexpected failure: {}", e
                );
            }

            let info = fixture.registry.market(market_id).unwrap();
            let held_by_market = fixture
                .registry
                .asset_balance(market_id, &market_id.account())
                .unwrap();
            prop_assert_eq!(held_by_market, info.reserves.real_asset);
            prop_assert_eq!(info.reserves.real_asset + fixture.distributed(market_id), supply);
            prop_assert!(info.reserves.real_asset <= supply);
        }

        // Market collateral never exceeds what the pool holds
        let info = fixture.registry.market(market_id).unwrap();
        prop_assert!(info.reserves.real_collateral <= fixture.treasury.pool_balance());
    }
}
