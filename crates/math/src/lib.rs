//! # Launchpad Math
//!
//! Exact arithmetic shared by the bonding-curve engine and its tooling:
//!
//! - Overflow-checked `U256` operations that never wrap
//! - 18-decimal unit conversion (parsing and formatting)
//! - Percentage fee rates expressed as exact rationals
//!
//! Every division truncates toward zero.

pub mod errors;
pub mod fee_math;
pub mod fixed_point;
pub mod safe_math;
pub mod serde_decimal;

pub use errors::{MathError, MathResult};
pub use ethnum::U256;
pub use fee_math::{FeeRate, FeeSplit, PROTOCOL_FEE, TRADING_FEE};
pub use fixed_point::*;
pub use safe_math::*;
