//! Error types for the scenario simulator

use launchpad_core::LaunchpadError;
use launchpad_math::MathError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Failed to read or write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid amount for {field}: {source}")]
    InvalidAmount {
        field: String,
        #[source]
        source: MathError,
    },

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Unknown market: {0}")]
    UnknownMarket(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Launchpad(#[from] LaunchpadError),
}

pub type SimulatorResult<T> = Result<T, SimulatorError>;

impl SimulatorError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

impl From<toml::de::Error> for SimulatorError {
    fn from(err: toml::de::Error) -> Self {
        SimulatorError::Parse(err.to_string())
    }
}

impl From<toml::ser::Error> for SimulatorError {
    fn from(err: toml::ser::Error) -> Self {
        SimulatorError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for SimulatorError {
    fn from(err: serde_json::Error) -> Self {
        SimulatorError::Serialization(err.to_string())
    }
}
