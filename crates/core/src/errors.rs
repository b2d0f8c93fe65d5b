//! # Core Error Types
//!
//! Every failure of a market operation leaves state untouched. The category
//! tells a caller whether changing the input can help.

use launchpad_math::{MathError, U256};
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::treasury::TreasuryError;
use crate::types::{AccountId, MarketId};

/// Errors produced by market and registry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchpadError {
    // ========================================================================
    // Rejected Input
    // ========================================================================
    #[error("Amount must be greater than zero")]
    ZeroInput,

    #[error("Total supply must be greater than zero")]
    InvalidSupply,

    // ========================================================================
    // State Conflict
    // ========================================================================
    #[error("Market {0} is inactive")]
    MarketInactive(MarketId),

    #[error("Market {0} not found")]
    MarketNotFound(MarketId),

    #[error("Reentrant call into market {0}")]
    Reentrancy(MarketId),

    #[error("Market state lock poisoned")]
    StatePoisoned,

    // ========================================================================
    // Economic Infeasibility
    // ========================================================================
    #[error("Trade produces zero output")]
    InsufficientOutput,

    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: U256, available: U256 },

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: U256, available: U256 },

    // ========================================================================
    // Arithmetic Fault
    // ========================================================================
    #[error(transparent)]
    Math(#[from] MathError),

    // ========================================================================
    // Authorization
    // ========================================================================
    #[error("Caller {0} is not authorized")]
    Unauthorized(AccountId),

    // ========================================================================
    // Collaborators
    // ========================================================================
    #[error("Asset ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Treasury error: {0}")]
    Treasury(#[from] TreasuryError),

    /// A failed trade could not be unwound on the asset ledger
    #[error("Market {market_id} could not reverse a ledger move: {reason}")]
    RollbackFailed { market_id: MarketId, reason: String },
}

/// Result type using core errors
pub type LaunchpadResult<T> = Result<T, LaunchpadError>;

/// Coarse grouping of [`LaunchpadError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller error; retry with corrected input
    RejectedInput,
    /// Wrong target or state; not retryable as-is
    StateConflict,
    /// Trade not feasible at this size; retry smaller
    EconomicInfeasibility,
    /// Parameters or reserves outside safe arithmetic bounds
    ArithmeticFault,
    Authorization,
    /// An external ledger or treasury refused the operation
    Collaborator,
}

impl ErrorCategory {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::EconomicInfeasibility)
    }
}

impl LaunchpadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ZeroInput | Self::InvalidSupply => ErrorCategory::RejectedInput,
            Self::MarketInactive(_)
            | Self::MarketNotFound(_)
            | Self::Reentrancy(_)
            | Self::StatePoisoned => ErrorCategory::StateConflict,
            Self::InsufficientOutput
            | Self::InsufficientLiquidity { .. }
            | Self::InsufficientBalance { .. } => ErrorCategory::EconomicInfeasibility,
            Self::Math(_) => ErrorCategory::ArithmeticFault,
            Self::Unauthorized(_) => ErrorCategory::Authorization,
            Self::Ledger(_) | Self::Treasury(_) | Self::RollbackFailed { .. } => {
                ErrorCategory::Collaborator
            }
        }
    }

    pub fn insufficient_liquidity(requested: U256, available: U256) -> Self {
        Self::InsufficientLiquidity { requested, available }
    }

    pub fn insufficient_balance(required: U256, available: U256) -> Self {
        Self::InsufficientBalance { required, available }
    }
}

impl<T> From<std::sync::PoisonError<T>> for LaunchpadError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        LaunchpadError::StatePoisoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(LaunchpadError::ZeroInput.category(), ErrorCategory::RejectedInput);
        assert_eq!(
            LaunchpadError::MarketInactive(MarketId::new(1)).category(),
            ErrorCategory::StateConflict
        );
        assert_eq!(
            LaunchpadError::Math(MathError::Underflow("test")).category(),
            ErrorCategory::ArithmeticFault
        );
        assert_eq!(
            LaunchpadError::Unauthorized(AccountId::from("mallory")).category(),
            ErrorCategory::Authorization
        );

        let err = LaunchpadError::insufficient_liquidity(U256::new(5), U256::new(4));
        assert!(err.category().is_retryable());
        assert!(!LaunchpadError::InvalidSupply.category().is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LaunchpadError::insufficient_balance(U256::new(10), U256::new(3));
        assert_eq!(format!("{}", err), "Insufficient balance: required 10, available 3");

        let err = LaunchpadError::MarketNotFound(MarketId::new(9));
        assert_eq!(format!("{}", err), "Market #9 not found");
    }
}
