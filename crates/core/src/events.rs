//! # Events
//!
//! Records emitted by market operations, in the order they occur.

use std::sync::{Mutex, PoisonError};

use launchpad_math::{serde_decimal, U256};
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, MarketId, TradeDirection};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Event {
    /// Emitted once when a market is published in the registry
    MarketCreated {
        market_id: MarketId,
        creator: AccountId,
        #[serde(with = "serde_decimal")]
        total_supply: U256,
        metadata_uri: String,
    },

    /// Emitted for every committed buy or sell
    Traded {
        market_id: MarketId,
        trader: AccountId,
        #[serde(with = "serde_decimal")]
        collateral_amount: U256,
        #[serde(with = "serde_decimal")]
        token_amount: U256,
        #[serde(with = "serde_decimal")]
        new_real_collateral_reserves: U256,
        #[serde(with = "serde_decimal")]
        new_real_asset_reserves: U256,
        direction: TradeDirection,
    },

    /// Emitted once, after the buy that crossed the graduation threshold
    MarketGraduated {
        market_id: MarketId,
        #[serde(with = "serde_decimal")]
        graduation_price: U256,
    },
}

impl Event {
    pub fn market_id(&self) -> MarketId {
        match self {
            Event::MarketCreated { market_id, .. }
            | Event::Traded { market_id, .. }
            | Event::MarketGraduated { market_id, .. } => *market_id,
        }
    }
}

/// Destination for emitted events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Append-only in-memory event log.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event recorded so far
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events concerning one market
    pub fn for_market(&self, market_id: MarketId) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|event| event.market_id() == market_id)
            .cloned()
            .collect()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
