//! # Launchpad Simulator
//!
//! Loads a TOML scenario, funds the listed accounts in an in-memory treasury,
//! and replays the scripted creations and trades against a [`MarketRegistry`].
//!
//! [`MarketRegistry`]: launchpad_core::MarketRegistry

pub mod config;
pub mod error;
pub mod scenario;

pub use config::{example_config, write_example, SimulatorConfig, StepConfig};
pub use error::{SimulatorError, SimulatorResult};
pub use scenario::{ScenarioReport, ScenarioRunner, StepOutcome, StepStatus};
