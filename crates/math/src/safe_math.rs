//! # Safe Math Operations
//!
//! Overflow-checked `U256` arithmetic. Every operation either returns the exact
//! result or a [`MathError`]; nothing saturates or wraps.

use ethnum::U256;

use crate::errors::{MathError, MathResult};

/// Macro to generate safe arithmetic functions
macro_rules! safe_arith {
    // Binary operations with checked methods
    ($fn_name:ident, $checked_method:ident, $error:ident, $context:literal) => {
        #[doc = concat!("Checked ", $context, "; fails with `MathError::", stringify!($error), "`.")]
        pub fn $fn_name(a: U256, b: U256) -> MathResult<U256> {
            a.$checked_method(b).ok_or(MathError::$error($context))
        }
    };

    // Division operations with zero check
    (div, $fn_name:ident, $op:tt, $context:literal) => {
        #[doc = concat!("Truncating ", $context, " with zero check.")]
        pub fn $fn_name(a: U256, b: U256) -> MathResult<U256> {
            if b == U256::ZERO {
                return Err(MathError::DivideByZero($context));
            }
            Ok(a $op b)
        }
    };
}

safe_arith!(safe_add, checked_add, Overflow, "u256 addition");
safe_arith!(safe_sub, checked_sub, Underflow, "u256 subtraction");
safe_arith!(safe_mul, checked_mul, Overflow, "u256 multiplication");
safe_arith!(div, safe_div, /, "u256 division");
safe_arith!(div, safe_rem, %, "u256 remainder");

/// `floor(a * b / denominator)` with a checked intermediate product.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> MathResult<U256> {
    if denominator == U256::ZERO {
        return Err(MathError::DivideByZero("mul_div"));
    }
    let product = a.checked_mul(b).ok_or(MathError::Overflow("mul_div"))?;
    Ok(product / denominator)
}

/// Narrow to `u128`, failing if the value does not fit.
pub fn to_u128(value: U256) -> MathResult<u128> {
    if value > U256::new(u128::MAX) {
        return Err(MathError::Overflow("u256 to u128 conversion"));
    }
    Ok(value.as_u128())
}
