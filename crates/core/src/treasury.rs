//! # Treasury
//!
//! Moves collateral between accounts and the shared pool that backs every
//! market. A [`Settlement`] is applied as one atomic batch: either every leg
//! lands or none does.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use launchpad_math::U256;
use thiserror::Error;

use crate::types::AccountId;

/// Errors reported by a treasury
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreasuryError {
    #[error("Insufficient funds in {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: AccountId,
        required: U256,
        available: U256,
    },

    #[error("Insufficient pool: required {required}, available {available}")]
    InsufficientPool { required: U256, available: U256 },

    #[error("Account {0} cannot receive collateral")]
    CannotReceive(AccountId),

    #[error("Collateral overflow")]
    Overflow,
}

pub type TreasuryResult<T> = Result<T, TreasuryError>;

/// One outgoing leg of a settlement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payout {
    pub to: AccountId,
    pub amount: U256,
}

/// Batch of collateral movements: an optional collection into the pool
/// followed by payouts from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settlement {
    pub collect: Option<(AccountId, U256)>,
    pub payouts: Vec<Payout>,
}

impl Settlement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect `amount` from `from` into the pool
    pub fn collect(mut self, from: &AccountId, amount: U256) -> Self {
        self.collect = Some((from.clone(), amount));
        self
    }

    /// Pay `amount` from the pool to `to`. Zero payouts are dropped.
    pub fn pay(mut self, to: &AccountId, amount: U256) -> Self {
        if amount != U256::ZERO {
            self.payouts.push(Payout { to: to.clone(), amount });
        }
        self
    }

    pub fn total_payout(&self) -> Option<U256> {
        self.payouts
            .iter()
            .try_fold(U256::ZERO, |total, payout| total.checked_add(payout.amount))
    }
}

/// Collateral primitive shared by all markets.
pub trait Treasury: Send + Sync {
    /// Apply every leg of `settlement` or none of them
    fn settle(&self, settlement: &Settlement) -> TreasuryResult<()>;

    fn balance_of(&self, account: &AccountId) -> U256;

    /// Collateral currently held by the pool
    fn pool_balance(&self) -> U256;
}

#[derive(Debug, Clone, Default)]
struct TreasuryState {
    balances: HashMap<AccountId, U256>,
    pool: U256,
    refusing: HashSet<AccountId>,
}

impl TreasuryState {
    fn apply(&mut self, settlement: &Settlement) -> TreasuryResult<()> {
        if let Some((from, amount)) = &settlement.collect {
            let available = self.balance_of(from);
            let remaining = available.checked_sub(*amount).ok_or_else(|| {
                TreasuryError::InsufficientFunds {
                    account: from.clone(),
                    required: *amount,
                    available,
                }
            })?;
            self.balances.insert(from.clone(), remaining);
            self.pool = self.pool.checked_add(*amount).ok_or(TreasuryError::Overflow)?;
        }

        let required = settlement.total_payout().ok_or(TreasuryError::Overflow)?;
        if required > self.pool {
            return Err(TreasuryError::InsufficientPool { required, available: self.pool });
        }

        for payout in &settlement.payouts {
            if self.refusing.contains(&payout.to) {
                return Err(TreasuryError::CannotReceive(payout.to.clone()));
            }
            let credited = self
                .balance_of(&payout.to)
                .checked_add(payout.amount)
                .ok_or(TreasuryError::Overflow)?;
            self.balances.insert(payout.to.clone(), credited);
            self.pool -= payout.amount;
        }
        Ok(())
    }

    fn balance_of(&self, account: &AccountId) -> U256 {
        self.balances.get(account).copied().unwrap_or(U256::ZERO)
    }
}

/// In-memory treasury with externally funded accounts.
#[derive(Debug, Default)]
pub struct InMemoryTreasury {
    state: Mutex<TreasuryState>,
}

impl InMemoryTreasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of outside collateral to `account`
    pub fn fund(&self, account: &AccountId, amount: U256) -> TreasuryResult<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let funded = state
            .balance_of(account)
            .checked_add(amount)
            .ok_or(TreasuryError::Overflow)?;
        state.balances.insert(account.clone(), funded);
        Ok(())
    }

    /// Make every future payout to `account` fail
    pub fn refuse(&self, account: &AccountId) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.refusing.insert(account.clone());
    }

    pub fn accept(&self, account: &AccountId) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.refusing.remove(account);
    }
}

impl Treasury for InMemoryTreasury {
    fn settle(&self, settlement: &Settlement) -> TreasuryResult<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        // Stage on a copy so a failing leg leaves nothing behind
        let mut staged = state.clone();
        staged.apply(settlement)?;
        *state = staged;
        Ok(())
    }

    fn balance_of(&self, account: &AccountId) -> U256 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .balance_of(account)
    }

    fn pool_balance(&self) -> U256 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).pool
    }
}
