//! # Fee Math
//!
//! Trade fees are percentages with a fractional literal (0.5%), so a rate is
//! stored as an exact rational number of percent rather than rounded to basis
//! points. `floor(amount * 0.5 / 100)` and `floor(amount / 200)` are the same
//! integer for every amount.

use ethnum::U256;
use serde::{Deserialize, Serialize};

use crate::errors::MathResult;
use crate::safe_math::{mul_div, safe_sub};

/// A fee rate of `numerator / denominator` percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRate {
    pub numerator: u64,
    pub denominator: u64,
}

/// Trading fee: 1%. Deducted from the collateral credited to the market.
pub const TRADING_FEE: FeeRate = FeeRate::percent(1, 1);

/// Protocol fee: 0.5%. Paid out to the protocol account.
pub const PROTOCOL_FEE: FeeRate = FeeRate::percent(1, 2);

impl FeeRate {
    /// Rate of `numerator / denominator` percent
    pub const fn percent(numerator: u64, denominator: u64) -> Self {
        Self { numerator, denominator }
    }

    /// `floor(amount * rate / 100)`
    pub fn apply(&self, amount: U256) -> MathResult<U256> {
        let numerator = U256::new(u128::from(self.numerator));
        let denominator = U256::new(u128::from(self.denominator) * 100);
        mul_div(amount, numerator, denominator)
    }
}

/// Both fees skimmed from one gross collateral amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    #[serde(with = "crate::serde_decimal")]
    pub gross: U256,
    #[serde(with = "crate::serde_decimal")]
    pub trading_fee: U256,
    #[serde(with = "crate::serde_decimal")]
    pub protocol_fee: U256,
    #[serde(with = "crate::serde_decimal")]
    pub net: U256,
}

impl FeeSplit {
    /// Split `gross` with the fixed trading and protocol rates.
    pub fn compute(gross: U256) -> MathResult<Self> {
        let trading_fee = TRADING_FEE.apply(gross)?;
        let protocol_fee = PROTOCOL_FEE.apply(gross)?;
        let net = safe_sub(safe_sub(gross, trading_fee)?, protocol_fee)?;
        Ok(Self {
            gross,
            trading_fee,
            protocol_fee,
            net,
        })
    }
}
