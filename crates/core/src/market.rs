//! # Curve Market
//!
//! One market's reserve state, its asset ledger, and the buy/sell state
//! machine. Trades are all-or-nothing: asset moves happen first and are
//! reversed if the collateral settlement fails, and reserves are committed only
//! after every side effect has landed.

use chrono::Utc;
use launchpad_math::{format_units, U256};
use tracing::{debug, error, info, warn};

use crate::curve;
use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::events::{Event, EventSink};
use crate::ledger::{AssetLedger, LedgerResult};
use crate::treasury::{Settlement, Treasury};
use crate::types::{AccountId, MarketId, MarketInfo, Reserves, TradeQuote, TradeReceipt};

/// Collaborators a trade settles through.
#[derive(Clone, Copy)]
pub struct TradeContext<'a> {
    pub treasury: &'a dyn Treasury,
    pub events: &'a dyn EventSink,
    /// Receives the protocol fee
    pub protocol_account: &'a AccountId,
}

pub struct CurveMarket {
    info: MarketInfo,
    ledger: Box<dyn AssetLedger>,
}

impl std::fmt::Debug for CurveMarket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveMarket").field("info", &self.info).finish_non_exhaustive()
    }
}

impl CurveMarket {
    /// Seed a market and mint its whole supply to the market account.
    pub fn create(
        market_id: MarketId,
        creator: AccountId,
        total_supply: U256,
        metadata_uri: String,
        mut ledger: Box<dyn AssetLedger>,
    ) -> LaunchpadResult<Self> {
        if total_supply == U256::ZERO {
            return Err(LaunchpadError::InvalidSupply);
        }
        // Every later graduation check must be computable
        curve::graduation_threshold(total_supply)?;

        ledger.mint(&market_id.account(), total_supply)?;

        Ok(Self {
            info: MarketInfo {
                market_id,
                creator,
                total_supply,
                reserves: Reserves::initial(total_supply),
                is_active: true,
                created_at: Utc::now().timestamp(),
                graduated_at: None,
                metadata_uri,
            },
            ledger,
        })
    }

    pub fn id(&self) -> MarketId {
        self.info.market_id
    }

    pub fn info(&self) -> MarketInfo {
        self.info.clone()
    }

    pub fn reserves(&self) -> Reserves {
        self.info.reserves
    }

    pub fn is_active(&self) -> bool {
        self.info.is_active
    }

    /// Current spot price, zero once virtual asset reserves are exhausted
    pub fn price(&self) -> LaunchpadResult<U256> {
        Ok(curve::spot_price(&self.info.reserves)?)
    }

    pub fn ledger(&self) -> &dyn AssetLedger {
        self.ledger.as_ref()
    }

    pub fn ledger_mut(&mut self) -> &mut dyn AssetLedger {
        self.ledger.as_mut()
    }

    fn ensure_active(&self) -> LaunchpadResult<()> {
        if !self.info.is_active {
            return Err(LaunchpadError::MarketInactive(self.info.market_id));
        }
        Ok(())
    }

    pub fn quote_buy(&self, collateral_in: U256) -> LaunchpadResult<TradeQuote> {
        if collateral_in == U256::ZERO {
            return Err(LaunchpadError::ZeroInput);
        }
        self.ensure_active()?;
        let quote = curve::quote_buy(&self.info.reserves, collateral_in)?;
        debug!(
            "Quoted buy on market {}: {} in -> {} tokens",
            self.info.market_id,
            format_units(collateral_in),
            format_units(quote.tokens)
        );
        Ok(quote)
    }

    pub fn quote_sell(&self, token_amount: U256) -> LaunchpadResult<TradeQuote> {
        if token_amount == U256::ZERO {
            return Err(LaunchpadError::ZeroInput);
        }
        self.ensure_active()?;
        let quote = curve::quote_sell(&self.info.reserves, token_amount)?;
        debug!(
            "Quoted sell on market {}: {} tokens -> {} out",
            self.info.market_id,
            format_units(token_amount),
            format_units(quote.collateral)
        );
        Ok(quote)
    }

    /// Spend `collateral_in` on the asset. Graduates the market when the buy
    /// drains virtual asset reserves to the threshold.
    pub fn buy(
        &mut self,
        ctx: TradeContext<'_>,
        buyer: &AccountId,
        collateral_in: U256,
    ) -> LaunchpadResult<TradeReceipt> {
        let quote = self.quote_buy(collateral_in)?;
        let graduates = curve::should_graduate(&quote.reserves_after, self.info.total_supply)?;
        let market_account = self.info.market_id.account();

        self.ledger.transfer(&market_account, buyer, quote.tokens)?;

        let settlement = Settlement::new()
            .collect(buyer, collateral_in)
            .pay(ctx.protocol_account, quote.fees.protocol_fee);
        if let Err(e) = ctx.treasury.settle(&settlement) {
            warn!("Buy on market {} failed to settle, reverting: {}", self.info.market_id, e);
            let undo = self.ledger.transfer(buyer, &market_account, quote.tokens);
            self.revert(undo)?;
            return Err(e.into());
        }

        let receipt = self.commit(ctx, buyer, &quote, graduates);
        Ok(receipt)
    }

    /// Sell `token_amount` back to the market. Returns a receipt whose
    /// `collateral_amount` is the gross amount released; the seller is paid
    /// that amount net of both fees.
    pub fn sell(
        &mut self,
        ctx: TradeContext<'_>,
        seller: &AccountId,
        token_amount: U256,
    ) -> LaunchpadResult<TradeReceipt> {
        if token_amount == U256::ZERO {
            return Err(LaunchpadError::ZeroInput);
        }
        self.ensure_active()?;
        let balance = self.ledger.balance_of(seller);
        if balance < token_amount {
            return Err(LaunchpadError::insufficient_balance(token_amount, balance));
        }
        let quote = self.quote_sell(token_amount)?;

        // The pool may hold less than the reserves record after a sweep
        let pool = ctx.treasury.pool_balance();
        if pool < quote.collateral {
            let available = pool.min(self.info.reserves.real_collateral);
            return Err(LaunchpadError::insufficient_liquidity(quote.collateral, available));
        }
        let market_account = self.info.market_id.account();

        let prior_allowance = self.ledger.allowance(seller, &market_account);
        self.ledger
            .transfer_from(&market_account, seller, &market_account, token_amount)?;

        let settlement = Settlement::new()
            .pay(seller, quote.fees.net)
            .pay(ctx.protocol_account, quote.fees.protocol_fee);
        if let Err(e) = ctx.treasury.settle(&settlement) {
            warn!("Sell on market {} failed to settle, reverting: {}", self.info.market_id, e);
            let undo = self.ledger.transfer(&market_account, seller, token_amount);
            self.revert(undo)?;
            let undo = self.ledger.approve(seller, &market_account, prior_allowance);
            self.revert(undo)?;
            return Err(e.into());
        }

        let receipt = self.commit(ctx, seller, &quote, false);
        Ok(receipt)
    }

    /// Surface a failed undo instead of the settlement error: the ledger
    /// no longer matches the reserves.
    fn revert(&self, undo: LedgerResult<()>) -> LaunchpadResult<()> {
        undo.map_err(|e| {
            error!("Market {} could not reverse a ledger move: {}", self.info.market_id, e);
            LaunchpadError::RollbackFailed {
                market_id: self.info.market_id,
                reason: e.to_string(),
            }
        })
    }

    /// Apply a settled quote. Infallible: everything that could fail was
    /// computed before any side effect.
    fn commit(
        &mut self,
        ctx: TradeContext<'_>,
        trader: &AccountId,
        quote: &TradeQuote,
        graduates: bool,
    ) -> TradeReceipt {
        let market_id = self.info.market_id;
        self.info.reserves = quote.reserves_after;

        info!(
            "{:?} on market {} by {}: {} collateral, {} tokens, price now {}",
            quote.direction,
            market_id,
            trader,
            format_units(quote.collateral),
            format_units(quote.tokens),
            format_units(quote.price_after)
        );
        ctx.events.emit(Event::Traded {
            market_id,
            trader: trader.clone(),
            collateral_amount: quote.collateral,
            token_amount: quote.tokens,
            new_real_collateral_reserves: quote.reserves_after.real_collateral,
            new_real_asset_reserves: quote.reserves_after.real_asset,
            direction: quote.direction,
        });

        if graduates {
            self.info.is_active = false;
            self.info.graduated_at = Some(Utc::now().timestamp());
            info!(
                "Market {} graduated at price {}",
                market_id,
                format_units(quote.price_after)
            );
            ctx.events.emit(Event::MarketGraduated {
                market_id,
                graduation_price: quote.price_after,
            });
        }

        TradeReceipt {
            market_id,
            direction: quote.direction,
            collateral_amount: quote.collateral,
            token_amount: quote.tokens,
            fees: quote.fees,
            reserves: quote.reserves_after,
            graduated: !self.info.is_active,
        }
    }
}
