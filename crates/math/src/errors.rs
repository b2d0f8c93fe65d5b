//! # Math Error Types

use thiserror::Error;

/// Failures of fixed-point arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("Math overflow in {0}")]
    Overflow(&'static str),

    #[error("Math underflow in {0}")]
    Underflow(&'static str),

    #[error("Division by zero in {0}")]
    DivideByZero(&'static str),

    #[error("Invalid decimal amount: {0}")]
    InvalidDecimal(String),
}

/// Result type using math errors
pub type MathResult<T> = Result<T, MathError>;

impl MathError {
    /// Create an invalid decimal error carrying the offending input
    pub fn invalid_decimal(input: &str) -> Self {
        Self::InvalidDecimal(input.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MathError::Overflow("u256 addition");
        assert_eq!(format!("{}", err), "Math overflow in u256 addition");

        let err = MathError::invalid_decimal("1.2.3");
        assert_eq!(format!("{}", err), "Invalid decimal amount: 1.2.3");
    }
}
