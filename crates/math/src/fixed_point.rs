//! # 18-Decimal Fixed Point
//!
//! Collateral and asset amounts are integers in base units, where one whole
//! unit is `10^18` base units. These helpers move between whole units, decimal
//! strings and base units without ever going through floating point.

use ethnum::U256;

use crate::errors::{MathError, MathResult};
use crate::safe_math::{safe_add, safe_mul};

/// Number of decimal places carried by every amount
pub const DECIMALS: usize = 18;

/// One whole unit in base units (10^18)
pub const WAD: U256 = U256::new(1_000_000_000_000_000_000);

/// Scale a whole-unit count to base units.
pub fn to_wad(units: u128) -> MathResult<U256> {
    safe_mul(U256::new(units), WAD)
}

/// Parse a decimal string such as `"1.5"` or `"69420000000"` into base units.
///
/// Accepts at most [`DECIMALS`] fractional digits. Signs, exponents, separators
/// and empty components other than a bare trailing `.` are rejected.
pub fn parse_units(input: &str) -> MathResult<U256> {
    let trimmed = input.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty()
        || fraction.len() > DECIMALS
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(MathError::invalid_decimal(input));
    }

    let whole_units =
        U256::from_str_radix(whole, 10).map_err(|_| MathError::invalid_decimal(input))?;
    let scaled = safe_mul(whole_units, WAD)?;

    if fraction.is_empty() {
        return Ok(scaled);
    }

    let padded = format!("{:0<width$}", fraction, width = DECIMALS);
    let fractional =
        U256::from_str_radix(&padded, 10).map_err(|_| MathError::invalid_decimal(input))?;
    safe_add(scaled, fractional)
}

/// Render base units as a decimal string with trailing zeros trimmed.
pub fn format_units(amount: U256) -> String {
    let whole = amount / WAD;
    let fraction = amount % WAD;
    if fraction == U256::ZERO {
        return whole.to_string();
    }

    let digits = format!("{:0>width$}", fraction.to_string(), width = DECIMALS);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_wad() {
        assert_eq!(to_wad(1).unwrap(), WAD);
        assert_eq!(
            to_wad(1_000_000_000).unwrap(),
            U256::new(1_000_000_000_000_000_000_000_000_000)
        );
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("1").unwrap(), WAD);
        assert_eq!(parse_units("1.5").unwrap(), U256::new(1_500_000_000_000_000_000));
        assert_eq!(parse_units("0.000000000000000001").unwrap(), U256::ONE);
        assert_eq!(parse_units(" 2. ").unwrap(), U256::new(2_000_000_000_000_000_000));
        assert_eq!(
            parse_units("69420000000").unwrap(),
            U256::new(69_420_000_000_000_000_000_000_000_000)
        );
    }

    #[test]
    fn test_parse_units_rejects_malformed() {
        for bad in ["", ".5", "-1", "1e18", "1.2.3", "abc", "1,000", "0.0000000000000000001"] {
            assert!(
                matches!(parse_units(bad), Err(MathError::InvalidDecimal(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::ZERO), "0");
        assert_eq!(format_units(WAD), "1");
        assert_eq!(format_units(U256::new(1_500_000_000_000_000_000)), "1.5");
        assert_eq!(format_units(U256::ONE), "0.000000000000000001");
        assert_eq!(format_units(U256::new(14_405_070_584_638_360)), "0.01440507058463836");
    }

    #[test]
    fn test_parse_format_agree() {
        for text in ["0.01440507058463836", "123456789.987654321", "42"] {
            assert_eq!(format_units(parse_units(text).unwrap()), text);
        }
    }
}
