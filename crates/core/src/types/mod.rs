//! # Core Types
//!
//! Identifiers, market snapshots and trade records shared by the engine and
//! its callers.

pub mod ids;
pub mod market;
pub mod trade;

pub use ids::*;
pub use market::*;
pub use trade::*;
