//! # Asset Ledger
//!
//! Each market issues its asset on its own fungible balance ledger. The market
//! only needs the small allowance-based interface below; [`InMemoryAssetLedger`]
//! is the implementation used by tests and the simulator.

use std::collections::{BTreeMap, HashMap};

use launchpad_math::U256;
use thiserror::Error;

use crate::types::{AccountId, MarketId};

/// Errors reported by an asset ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: U256, available: U256 },

    #[error("Insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance { required: U256, available: U256 },

    #[error("Balance overflow")]
    Overflow,

    #[error("Rejected: {0}")]
    Rejected(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Fungible balance ledger for one market's asset.
///
/// A trade whose collateral settlement fails is unwound by moving the asset
/// straight back and restoring the prior allowance. If either of those calls
/// fails, the trade reports [`RollbackFailed`](crate::LaunchpadError::RollbackFailed).
pub trait AssetLedger: Send + Sync {
    /// Create `amount` new units owned by `to`
    fn mint(&mut self, to: &AccountId, amount: U256) -> LedgerResult<()>;

    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: U256) -> LedgerResult<()>;

    /// Move `amount` out of `from` on behalf of `spender`, consuming allowance
    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: U256,
    ) -> LedgerResult<()>;

    /// Set (not add to) the allowance of `spender` over `owner`'s balance
    fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: U256) -> LedgerResult<()>;

    fn balance_of(&self, account: &AccountId) -> U256;

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> U256;

    fn total_supply(&self) -> U256;

    /// Every account with a non-zero balance
    fn holders(&self) -> Vec<(AccountId, U256)>;
}

/// Creates the ledger backing a newly created market.
pub trait LedgerFactory: Send + Sync {
    fn create(&self, market_id: MarketId) -> Box<dyn AssetLedger>;
}

/// Ledger kept entirely in memory.
///
/// An allowance of `U256::MAX` is treated as unlimited and never decremented.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssetLedger {
    balances: BTreeMap<AccountId, U256>,
    allowances: HashMap<(AccountId, AccountId), U256>,
    total_supply: U256,
}

impl InMemoryAssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn debit(&mut self, from: &AccountId, amount: U256) -> LedgerResult<()> {
        let available = self.balance_of(from);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance { required: amount, available })?;
        if remaining == U256::ZERO {
            self.balances.remove(from);
        } else {
            self.balances.insert(from.clone(), remaining);
        }
        Ok(())
    }

    fn credit(&mut self, to: &AccountId, amount: U256) -> LedgerResult<()> {
        if amount == U256::ZERO {
            return Ok(());
        }
        let updated = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert(to.clone(), updated);
        Ok(())
    }
}

impl AssetLedger for InMemoryAssetLedger {
    fn mint(&mut self, to: &AccountId, amount: U256) -> LedgerResult<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.credit(to, amount)?;
        self.total_supply = supply;
        Ok(())
    }

    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: U256) -> LedgerResult<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance { required: amount, available });
        }
        if from == to {
            return Ok(());
        }
        // Balances sum to total_supply, so the credit cannot overflow
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: U256,
    ) -> LedgerResult<()> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance { required: amount, available: allowed });
        }
        self.transfer(from, to, amount)?;
        if allowed != U256::MAX {
            self.allowances
                .insert((from.clone(), spender.clone()), allowed - amount);
        }
        Ok(())
    }

    fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: U256) -> LedgerResult<()> {
        let key = (owner.clone(), spender.clone());
        if amount == U256::ZERO {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
        Ok(())
    }

    fn balance_of(&self, account: &AccountId) -> U256 {
        self.balances.get(account).copied().unwrap_or(U256::ZERO)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> U256 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn holders(&self) -> Vec<(AccountId, U256)> {
        self.balances
            .iter()
            .map(|(account, balance)| (account.clone(), *balance))
            .collect()
    }
}

/// Hands every market a fresh [`InMemoryAssetLedger`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryLedgerFactory;

impl LedgerFactory for InMemoryLedgerFactory {
    fn create(&self, _market_id: MarketId) -> Box<dyn AssetLedger> {
        Box::new(InMemoryAssetLedger::new())
    }
}
