//! Per-thread record of the markets the current thread is inside of.
//!
//! A collaborator callback that re-enters the same market would otherwise block
//! forever on that market's lock.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::types::MarketId;

thread_local! {
    static ENTERED: RefCell<HashSet<MarketId>> = RefCell::new(HashSet::new());
}

/// Marks a market as entered until dropped.
#[derive(Debug)]
pub(crate) struct MarketGuard {
    market_id: MarketId,
}

impl MarketGuard {
    pub(crate) fn enter(market_id: MarketId) -> LaunchpadResult<Self> {
        let fresh = ENTERED.with(|entered| entered.borrow_mut().insert(market_id));
        if !fresh {
            return Err(LaunchpadError::Reentrancy(market_id));
        }
        Ok(Self { market_id })
    }
}

impl Drop for MarketGuard {
    fn drop(&mut self) {
        // try_with: the thread-local may already be gone during thread teardown
        let _ = ENTERED.try_with(|entered| entered.borrow_mut().remove(&self.market_id));
    }
}
