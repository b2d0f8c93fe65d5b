//! # Trade Types

use launchpad_math::{serde_decimal, FeeSplit, U256};
use serde::{Deserialize, Serialize};

use crate::types::ids::MarketId;
use crate::types::market::Reserves;

/// Side of a trade from the trader's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeDirection {
    Buy,
    Sell,
}

/// Fully computed outcome of a prospective trade. Executing a trade applies
/// exactly this quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeQuote {
    pub direction: TradeDirection,
    /// Gross collateral: paid in on a buy, released on a sell
    #[serde(with = "serde_decimal")]
    pub collateral: U256,
    /// Asset units: received on a buy, given up on a sell
    #[serde(with = "serde_decimal")]
    pub tokens: U256,
    pub fees: FeeSplit,
    pub reserves_before: Reserves,
    pub reserves_after: Reserves,
    #[serde(with = "serde_decimal")]
    pub price_after: U256,
}

/// Record of a committed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub market_id: MarketId,
    pub direction: TradeDirection,
    /// Gross collateral amount of the trade
    #[serde(with = "serde_decimal")]
    pub collateral_amount: U256,
    #[serde(with = "serde_decimal")]
    pub token_amount: U256,
    pub fees: FeeSplit,
    pub reserves: Reserves,
    /// Set when this trade closed the market
    pub graduated: bool,
}

impl TradeReceipt {
    /// Collateral that actually reached the seller (zero for buys)
    pub fn proceeds(&self) -> U256 {
        match self.direction {
            TradeDirection::Buy => U256::ZERO,
            TradeDirection::Sell => self.fees.net,
        }
    }
}
