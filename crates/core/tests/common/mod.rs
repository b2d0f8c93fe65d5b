//! Shared fixtures for the registry integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use launchpad_core::{
    AccountId, EventLog, InMemoryLedgerFactory, InMemoryTreasury, LedgerFactory, MarketId,
    MarketRegistry, RegistryConfig, U256,
};
use launchpad_math::to_wad;

pub const OWNER: &str = "owner";
pub const PROTOCOL: &str = "protocol";

pub fn acct(name: &str) -> AccountId {
    AccountId::from(name)
}

pub fn wad(units: u128) -> U256 {
    to_wad(units).unwrap()
}

pub struct Fixture {
    pub registry: Arc<MarketRegistry>,
    pub treasury: Arc<InMemoryTreasury>,
    pub events: Arc<EventLog>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_ledgers(Box::new(InMemoryLedgerFactory))
    }

    pub fn with_ledgers(ledgers: Box<dyn LedgerFactory>) -> Self {
        let treasury = Arc::new(InMemoryTreasury::new());
        let events = Arc::new(EventLog::new());
        let registry = MarketRegistry::new(
            RegistryConfig {
                owner: acct(OWNER),
                protocol_account: acct(PROTOCOL),
            },
            treasury.clone(),
            events.clone(),
            ledgers,
        );
        Self {
            registry: Arc::new(registry),
            treasury,
            events,
        }
    }

    /// Give `name` outside collateral
    pub fn fund(&self, name: &str, amount: U256) -> AccountId {
        let account = acct(name);
        self.treasury.fund(&account, amount).unwrap();
        account
    }

    pub fn market(&self, total_supply: U256) -> MarketId {
        self.registry
            .create_market(&acct("creator"), total_supply, "ipfs://launch")
            .unwrap()
    }

    /// Let the market pull any amount of `owner`'s asset
    pub fn approve_market(&self, market_id: MarketId, owner: &AccountId) {
        self.registry
            .approve(market_id, owner, &market_id.account(), U256::MAX)
            .unwrap();
    }

    /// Sum of balances held outside the market account
    pub fn distributed(&self, market_id: MarketId) -> U256 {
        self.registry
            .asset_holders(market_id)
            .unwrap()
            .into_iter()
            .filter(|(account, _)| !account.is_market_account())
            .fold(U256::ZERO, |total, (_, balance)| total + balance)
    }
}
