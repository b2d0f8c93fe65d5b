//! # Launchpad Core
//!
//! The bonding-curve market engine. It provides:
//!
//! - [`curve`]: pure constant-product quotes for buys and sells
//! - [`market::CurveMarket`]: one market's reserves, fee skimming and the
//!   graduation latch
//! - [`registry::MarketRegistry`]: creation, lookup, enumeration and routing,
//!   with one lock per market
//! - Seams for the external collaborators: [`ledger::AssetLedger`],
//!   [`treasury::Treasury`] and [`events::EventSink`], each with an in-memory
//!   implementation

pub mod constants;
pub mod curve;
pub mod errors;
pub mod events;
mod guard;
pub mod ledger;
pub mod market;
pub mod registry;
pub mod treasury;
pub mod types;

pub use constants::*;
pub use errors::{ErrorCategory, LaunchpadError, LaunchpadResult};
pub use events::{Event, EventLog, EventSink};
pub use launchpad_math::U256;
pub use ledger::{AssetLedger, InMemoryAssetLedger, InMemoryLedgerFactory, LedgerError, LedgerFactory};
pub use market::CurveMarket;
pub use registry::{MarketRegistry, RegistryConfig};
pub use treasury::{InMemoryTreasury, Payout, Settlement, Treasury, TreasuryError};
pub use types::*;
