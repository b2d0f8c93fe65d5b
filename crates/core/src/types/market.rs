//! # Market Types

use launchpad_math::{safe_mul, safe_sub, serde_decimal, MathResult, U256};
use serde::{Deserialize, Serialize};

use crate::constants::{VIRTUAL_ASSET_RESERVES, VIRTUAL_COLLATERAL_RESERVES};
use crate::types::ids::{AccountId, MarketId};

/// The four reserve quantities a trade moves together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserves {
    /// Pricing-only collateral quantity
    #[serde(with = "serde_decimal")]
    pub virtual_collateral: U256,
    /// Pricing-only asset quantity
    #[serde(with = "serde_decimal")]
    pub virtual_asset: U256,
    /// Collateral credited to the market
    #[serde(with = "serde_decimal")]
    pub real_collateral: U256,
    /// Asset units not yet distributed
    #[serde(with = "serde_decimal")]
    pub real_asset: U256,
}

impl Reserves {
    /// Reserves of a freshly created market
    pub fn initial(total_supply: U256) -> Self {
        Self {
            virtual_collateral: VIRTUAL_COLLATERAL_RESERVES,
            virtual_asset: VIRTUAL_ASSET_RESERVES,
            real_collateral: U256::ZERO,
            real_asset: total_supply,
        }
    }

    /// Constant-product invariant `virtual_collateral * virtual_asset`
    pub fn invariant(&self) -> MathResult<U256> {
        safe_mul(self.virtual_collateral, self.virtual_asset)
    }

    /// Asset units distributed out of the market so far
    pub fn distributed(&self, total_supply: U256) -> MathResult<U256> {
        safe_sub(total_supply, self.real_asset)
    }
}

/// Lifecycle state of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketStatus {
    Active,
    /// Terminal: trading is permanently closed
    Graduated,
}

/// Read-only snapshot of one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub market_id: MarketId,
    pub creator: AccountId,
    #[serde(with = "serde_decimal")]
    pub total_supply: U256,
    pub reserves: Reserves,
    pub is_active: bool,
    /// Unix seconds
    pub created_at: i64,
    pub graduated_at: Option<i64>,
    pub metadata_uri: String,
}

impl MarketInfo {
    pub fn status(&self) -> MarketStatus {
        if self.is_active {
            MarketStatus::Active
        } else {
            MarketStatus::Graduated
        }
    }

    /// Account holding the market's undistributed supply
    pub fn account(&self) -> AccountId {
        self.market_id.account()
    }
}
