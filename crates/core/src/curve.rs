//! # Constant-Product Curve
//!
//! Pure quote functions over [`Reserves`]. The post-trade virtual reserve on
//! the output side is floored, so the product `vc * va` may drop by less than
//! one unit of the input-side reserve per trade and never grows.

use launchpad_math::{mul_div, safe_add, safe_sub, FeeSplit, MathResult, U256};

use crate::constants::{GRADUATION_THRESHOLD_PERCENT, PRICE_SCALE};
use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::types::{Reserves, TradeDirection, TradeQuote};

/// Spot price in collateral base units per whole asset unit.
///
/// Returns zero when virtual asset reserves are exhausted.
pub fn spot_price(reserves: &Reserves) -> MathResult<U256> {
    if reserves.virtual_asset == U256::ZERO {
        return Ok(U256::ZERO);
    }
    mul_div(reserves.virtual_collateral, PRICE_SCALE, reserves.virtual_asset)
}

/// `floor(total_supply * 10 / 100)`
pub fn graduation_threshold(total_supply: U256) -> MathResult<U256> {
    mul_div(total_supply, U256::new(GRADUATION_THRESHOLD_PERCENT), U256::new(100))
}

/// Whether the reserves have crossed the graduation threshold
pub fn should_graduate(reserves: &Reserves, total_supply: U256) -> MathResult<bool> {
    Ok(reserves.virtual_asset <= graduation_threshold(total_supply)?)
}

/// Quote spending `collateral_in` on the asset.
pub fn quote_buy(reserves: &Reserves, collateral_in: U256) -> LaunchpadResult<TradeQuote> {
    if collateral_in == U256::ZERO {
        return Err(LaunchpadError::ZeroInput);
    }

    let new_collateral = safe_add(reserves.virtual_collateral, collateral_in)?;
    let new_asset = mul_div(reserves.virtual_collateral, reserves.virtual_asset, new_collateral)?;
    let tokens = safe_sub(reserves.virtual_asset, new_asset)?;

    if tokens == U256::ZERO {
        return Err(LaunchpadError::InsufficientOutput);
    }
    if tokens > reserves.real_asset {
        return Err(LaunchpadError::insufficient_liquidity(tokens, reserves.real_asset));
    }

    let fees = FeeSplit::compute(collateral_in)?;
    let reserves_after = Reserves {
        virtual_collateral: new_collateral,
        virtual_asset: safe_sub(reserves.virtual_asset, tokens)?,
        real_collateral: safe_add(reserves.real_collateral, fees.net)?,
        real_asset: safe_sub(reserves.real_asset, tokens)?,
    };

    Ok(TradeQuote {
        direction: TradeDirection::Buy,
        collateral: collateral_in,
        tokens,
        fees,
        reserves_before: *reserves,
        price_after: spot_price(&reserves_after)?,
        reserves_after,
    })
}

/// Quote selling `token_amount` back to the market.
pub fn quote_sell(reserves: &Reserves, token_amount: U256) -> LaunchpadResult<TradeQuote> {
    if token_amount == U256::ZERO {
        return Err(LaunchpadError::ZeroInput);
    }

    let new_asset = safe_add(reserves.virtual_asset, token_amount)?;
    let new_collateral = mul_div(reserves.virtual_collateral, reserves.virtual_asset, new_asset)?;
    let collateral_out = safe_sub(reserves.virtual_collateral, new_collateral)?;

    if collateral_out == U256::ZERO {
        return Err(LaunchpadError::InsufficientOutput);
    }
    if collateral_out > reserves.real_collateral {
        return Err(LaunchpadError::insufficient_liquidity(
            collateral_out,
            reserves.real_collateral,
        ));
    }

    let fees = FeeSplit::compute(collateral_out)?;
    let reserves_after = Reserves {
        virtual_collateral: safe_sub(reserves.virtual_collateral, collateral_out)?,
        virtual_asset: new_asset,
        real_collateral: safe_sub(reserves.real_collateral, collateral_out)?,
        real_asset: safe_add(reserves.real_asset, token_amount)?,
    };

    Ok(TradeQuote {
        direction: TradeDirection::Sell,
        collateral: collateral_out,
        tokens: token_amount,
        fees,
        reserves_before: *reserves,
        price_after: spot_price(&reserves_after)?,
        reserves_after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_math::{to_wad, WAD};

    fn fresh(total_units: u128) -> Reserves {
        Reserves::initial(to_wad(total_units).unwrap())
    }

    #[test]
    fn test_initial_price() {
        let price = spot_price(&fresh(1_000_000)).unwrap();
        assert_eq!(price, U256::new(69_420_000_000_000_000_000));
    }

    #[test]
    fn test_quote_buy_one_unit() {
        let quote = quote_buy(&fresh(1_000_000), WAD).unwrap();
        assert_eq!(quote.tokens, U256::new(14_405_070_584_638_360));
        assert_eq!(quote.fees.net, U256::new(985_000_000_000_000_000));
        assert_eq!(
            quote.reserves_after.virtual_collateral,
            U256::new(69_420_000_001_000_000_000_000_000_000)
        );
        assert_eq!(quote.reserves_after.real_collateral, quote.fees.net);
        assert_eq!(quote.price_after, U256::new(69_420_000_002_000_000_000));
    }

    #[test]
    fn test_quote_buy_invariant_within_one_truncation() {
        let reserves = fresh(1_000_000);
        let quote = quote_buy(&reserves, WAD).unwrap();
        let before = reserves.invariant().unwrap();
        let after = quote.reserves_after.invariant().unwrap();
        assert!(after <= before);
        assert!(before - after < quote.reserves_after.virtual_collateral);
    }

    #[test]
    fn test_quote_buy_dust_still_moves_one_unit() {
        let quote = quote_buy(&fresh(1_000_000), U256::ONE).unwrap();
        assert_eq!(quote.tokens, U256::ONE);
        assert_eq!(quote.fees.net, U256::ONE);
    }

    #[test]
    fn test_quote_buy_zero_input() {
        assert_eq!(quote_buy(&fresh(1), U256::ZERO), Err(LaunchpadError::ZeroInput));
    }

    #[test]
    fn test_quote_buy_insufficient_liquidity() {
        // One whole asset unit of supply cannot cover a 1-unit collateral buy
        let reserves = fresh(0);
        let reserves = Reserves { real_asset: U256::new(1_000), ..reserves };
        let err = quote_buy(&reserves, WAD).unwrap_err();
        assert_eq!(
            err,
            LaunchpadError::insufficient_liquidity(U256::new(14_405_070_584_638_360), U256::new(1_000))
        );
    }

    #[test]
    fn test_quote_buy_insufficient_output() {
        // Any positive buy against non-empty virtual reserves yields at least
        // one unit, so only exhausted reserves produce nothing
        let reserves = Reserves {
            virtual_asset: U256::ZERO,
            ..fresh(1_000)
        };
        assert_eq!(quote_buy(&reserves, WAD), Err(LaunchpadError::InsufficientOutput));
    }

    #[test]
    fn test_quote_sell_against_empty_collateral() {
        let err = quote_sell(&fresh(1_000_000), WAD).unwrap_err();
        assert!(matches!(err, LaunchpadError::InsufficientLiquidity { .. }));
    }

    #[test]
    fn test_quote_sell_after_buy() {
        let start = fresh(1_000_000);
        let buy = quote_buy(&start, WAD).unwrap();
        let half = buy.tokens / U256::new(2);
        let sell = quote_sell(&buy.reserves_after, half).unwrap();

        assert_eq!(sell.direction, TradeDirection::Sell);
        assert!(sell.collateral < WAD);
        assert!(sell.price_after < buy.price_after);
        assert_eq!(sell.reserves_after.real_asset, buy.reserves_after.real_asset + half);
        assert_eq!(
            sell.reserves_after.real_collateral,
            buy.reserves_after.real_collateral - sell.collateral
        );
    }

    #[test]
    fn test_full_round_trip_gross_includes_rounding_dust() {
        // Selling everything back releases x plus the floor remainders; fees
        // still leave the seller short of x.
        let start = fresh(1_000_000);
        let buy = quote_buy(&start, WAD).unwrap();
        let reserves = Reserves {
            real_collateral: WAD * U256::new(2),
            ..buy.reserves_after
        };
        let sell = quote_sell(&reserves, buy.tokens).unwrap();
        assert_eq!(sell.collateral, U256::new(1_000_000_000_000_000_022));
        assert!(sell.fees.net < WAD);
    }

    #[test]
    fn test_graduation_threshold() {
        assert_eq!(graduation_threshold(U256::new(1_000)).unwrap(), U256::new(100));
        assert_eq!(graduation_threshold(U256::new(99)).unwrap(), U256::new(9));

        let supply = to_wad(1_000_000).unwrap();
        assert!(!should_graduate(&Reserves::initial(supply), supply).unwrap());

        // Supply at 10x the virtual asset reserves graduates immediately
        let supply = to_wad(10_000_000_000).unwrap();
        assert!(should_graduate(&Reserves::initial(supply), supply).unwrap());
    }

    #[test]
    fn test_spot_price_zero_asset() {
        let reserves = Reserves {
            virtual_asset: U256::ZERO,
            ..fresh(1)
        };
        assert_eq!(spot_price(&reserves).unwrap(), U256::ZERO);
    }
}
