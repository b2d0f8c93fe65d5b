//! # Curve Constants
//!
//! Fixed curve parameters. They are not governable.

use launchpad_math::U256;

/// Initial virtual collateral reserves: 69,420,000,000 collateral units
pub const VIRTUAL_COLLATERAL_RESERVES: U256 = U256::new(69_420_000_000_000_000_000_000_000_000);

/// Initial virtual asset reserves: 1,000,000,000 asset units
pub const VIRTUAL_ASSET_RESERVES: U256 = U256::new(1_000_000_000_000_000_000_000_000_000);

/// Scale of a reported price (one collateral unit = 10^18)
pub const PRICE_SCALE: U256 = launchpad_math::WAD;

/// A market graduates once virtual asset reserves fall to this percentage of
/// total supply
pub const GRADUATION_THRESHOLD_PERCENT: u128 = 10;

/// Prefix of the ledger account that holds a market's undistributed supply
pub const MARKET_ACCOUNT_PREFIX: &str = "market:";
