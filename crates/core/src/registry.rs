//! # Market Registry
//!
//! Owns every market and routes calls to them by id. The market map is locked
//! only long enough to look up a market's handle; the operation itself runs
//! under that market's own lock, so markets never wait on each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use launchpad_math::{format_units, U256};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::events::{Event, EventSink};
use crate::guard::MarketGuard;
use crate::ledger::LedgerFactory;
use crate::market::{CurveMarket, TradeContext};
use crate::treasury::{Settlement, Treasury};
use crate::types::{AccountId, MarketId, MarketInfo, TradeQuote, TradeReceipt};

/// Privileged accounts of a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// May sweep the collateral pool
    pub owner: AccountId,
    /// Receives the protocol fee of every trade
    pub protocol_account: AccountId,
}

type MarketHandle = Arc<RwLock<CurveMarket>>;

#[derive(Default)]
struct RegistryState {
    markets: HashMap<MarketId, MarketHandle>,
    by_creator: HashMap<AccountId, Vec<MarketId>>,
    /// Creation order
    order: Vec<MarketId>,
}

pub struct MarketRegistry {
    config: RegistryConfig,
    treasury: Arc<dyn Treasury>,
    events: Arc<dyn EventSink>,
    ledgers: Box<dyn LedgerFactory>,
    next_id: AtomicU64,
    state: RwLock<RegistryState>,
}

impl MarketRegistry {
    pub fn new(
        config: RegistryConfig,
        treasury: Arc<dyn Treasury>,
        events: Arc<dyn EventSink>,
        ledgers: Box<dyn LedgerFactory>,
    ) -> Self {
        Self {
            config,
            treasury,
            events,
            ledgers,
            next_id: AtomicU64::new(1),
            state: RwLock::new(RegistryState::default()),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn treasury(&self) -> &dyn Treasury {
        self.treasury.as_ref()
    }

    fn trade_context(&self) -> TradeContext<'_> {
        TradeContext {
            treasury: self.treasury.as_ref(),
            events: self.events.as_ref(),
            protocol_account: &self.config.protocol_account,
        }
    }

    // ========================================================================
    // Creation & Lookup
    // ========================================================================

    /// Create a market minting `total_supply` to its own account. Nothing is
    /// recorded unless creation succeeds in full.
    pub fn create_market(
        &self,
        creator: &AccountId,
        total_supply: U256,
        metadata_uri: &str,
    ) -> LaunchpadResult<MarketId> {
        ensure_caller(creator)?;
        if total_supply == U256::ZERO {
            return Err(LaunchpadError::InvalidSupply);
        }

        // Ids consumed by failed creations are not reused
        let market_id = MarketId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let ledger = self.ledgers.create(market_id);
        let market = CurveMarket::create(
            market_id,
            creator.clone(),
            total_supply,
            metadata_uri.to_string(),
            ledger,
        )?;

        // Hold the new market until its creation record is out, so no trade
        // can be logged ahead of it
        let handle: MarketHandle = Arc::new(RwLock::new(market));
        let _guard = MarketGuard::enter(market_id)?;
        let _held = handle.write()?;

        {
            let mut state = self.state.write()?;
            state.markets.insert(market_id, handle.clone());
            state.by_creator.entry(creator.clone()).or_default().push(market_id);
            state.order.push(market_id);
        }

        info!(
            "Created market {} for {} with supply {}",
            market_id,
            creator,
            format_units(total_supply)
        );
        self.events.emit(Event::MarketCreated {
            market_id,
            creator: creator.clone(),
            total_supply,
            metadata_uri: metadata_uri.to_string(),
        });
        Ok(market_id)
    }

    fn handle(&self, market_id: MarketId) -> LaunchpadResult<MarketHandle> {
        let state = self.state.read()?;
        state
            .markets
            .get(&market_id)
            .cloned()
            .ok_or(LaunchpadError::MarketNotFound(market_id))
    }

    fn with_market<T>(
        &self,
        market_id: MarketId,
        f: impl FnOnce(&CurveMarket) -> LaunchpadResult<T>,
    ) -> LaunchpadResult<T> {
        let handle = self.handle(market_id)?;
        let _guard = MarketGuard::enter(market_id)?;
        let market = handle.read()?;
        f(&*market)
    }

    fn with_market_mut<T>(
        &self,
        market_id: MarketId,
        f: impl FnOnce(&mut CurveMarket) -> LaunchpadResult<T>,
    ) -> LaunchpadResult<T> {
        let handle = self.handle(market_id)?;
        let _guard = MarketGuard::enter(market_id)?;
        let mut market = handle.write()?;
        f(&mut *market)
    }

    /// Snapshot of one market
    pub fn market(&self, market_id: MarketId) -> LaunchpadResult<MarketInfo> {
        self.with_market(market_id, |market| Ok(market.info()))
    }

    /// Markets created by `creator`, oldest first
    pub fn markets_by_creator(&self, creator: &AccountId) -> LaunchpadResult<Vec<MarketId>> {
        let state = self.state.read()?;
        Ok(state.by_creator.get(creator).cloned().unwrap_or_default())
    }

    pub fn market_count(&self) -> LaunchpadResult<u64> {
        let state = self.state.read()?;
        Ok(state.order.len() as u64)
    }

    /// Page through market snapshots in creation order
    pub fn list_markets(&self, offset: usize, limit: usize) -> LaunchpadResult<Vec<MarketInfo>> {
        let page: Vec<MarketId> = {
            let state = self.state.read()?;
            state.order.iter().skip(offset).take(limit).copied().collect()
        };
        page.into_iter().map(|market_id| self.market(market_id)).collect()
    }

    // ========================================================================
    // Pricing & Trading
    // ========================================================================

    pub fn price(&self, market_id: MarketId) -> LaunchpadResult<U256> {
        self.with_market(market_id, |market| market.price())
    }

    pub fn quote_buy(&self, market_id: MarketId, collateral_in: U256) -> LaunchpadResult<TradeQuote> {
        self.with_market(market_id, |market| market.quote_buy(collateral_in))
    }

    pub fn quote_sell(&self, market_id: MarketId, token_amount: U256) -> LaunchpadResult<TradeQuote> {
        self.with_market(market_id, |market| market.quote_sell(token_amount))
    }

    pub fn buy(
        &self,
        market_id: MarketId,
        collateral_in: U256,
        buyer: &AccountId,
    ) -> LaunchpadResult<TradeReceipt> {
        ensure_caller(buyer)?;
        let ctx = self.trade_context();
        self.with_market_mut(market_id, |market| market.buy(ctx, buyer, collateral_in))
    }

    /// Sell requires the seller to have approved the market account
    /// ([`MarketId::account`]) for at least `token_amount`.
    pub fn sell(
        &self,
        market_id: MarketId,
        token_amount: U256,
        seller: &AccountId,
    ) -> LaunchpadResult<TradeReceipt> {
        ensure_caller(seller)?;
        let ctx = self.trade_context();
        self.with_market_mut(market_id, |market| market.sell(ctx, seller, token_amount))
    }

    // ========================================================================
    // Asset Ledgers
    // ========================================================================

    pub fn asset_balance(&self, market_id: MarketId, account: &AccountId) -> LaunchpadResult<U256> {
        self.with_market(market_id, |market| Ok(market.ledger().balance_of(account)))
    }

    pub fn asset_allowance(
        &self,
        market_id: MarketId,
        owner: &AccountId,
        spender: &AccountId,
    ) -> LaunchpadResult<U256> {
        self.with_market(market_id, |market| Ok(market.ledger().allowance(owner, spender)))
    }

    /// Every holder of a market's asset, including the market account
    pub fn asset_holders(&self, market_id: MarketId) -> LaunchpadResult<Vec<(AccountId, U256)>> {
        self.with_market(market_id, |market| Ok(market.ledger().holders()))
    }

    pub fn approve(
        &self,
        market_id: MarketId,
        owner: &AccountId,
        spender: &AccountId,
        amount: U256,
    ) -> LaunchpadResult<()> {
        ensure_caller(owner)?;
        self.with_market_mut(market_id, |market| {
            Ok(market.ledger_mut().approve(owner, spender, amount)?)
        })
    }

    pub fn transfer_asset(
        &self,
        market_id: MarketId,
        from: &AccountId,
        to: &AccountId,
        amount: U256,
    ) -> LaunchpadResult<()> {
        ensure_caller(from)?;
        if amount == U256::ZERO {
            return Err(LaunchpadError::ZeroInput);
        }
        self.with_market_mut(market_id, |market| {
            let available = market.ledger().balance_of(from);
            if available < amount {
                return Err(LaunchpadError::insufficient_balance(amount, available));
            }
            Ok(market.ledger_mut().transfer(from, to, amount)?)
        })
    }

    // ========================================================================
    // Privileged
    // ========================================================================

    /// Sweep the whole collateral pool to the owner. Market reserves are left
    /// as they are.
    pub fn emergency_withdraw(&self, caller: &AccountId) -> LaunchpadResult<U256> {
        if *caller != self.config.owner {
            warn!("Rejected emergency withdraw from {}", caller);
            return Err(LaunchpadError::Unauthorized(caller.clone()));
        }

        let amount = self.treasury.pool_balance();
        if amount == U256::ZERO {
            return Ok(amount);
        }
        self.treasury
            .settle(&Settlement::new().pay(&self.config.owner, amount))?;

        warn!("Emergency withdraw swept {} to {}", format_units(amount), caller);
        Ok(amount)
    }
}

/// Market accounts hold undistributed supply and never act as callers.
fn ensure_caller(caller: &AccountId) -> LaunchpadResult<()> {
    if caller.is_market_account() {
        warn!("Rejected call made as market account {}", caller);
        return Err(LaunchpadError::Unauthorized(caller.clone()));
    }
    Ok(())
}
