use std::collections::HashSet;
use std::fs;
use std::path::Path;

use launchpad_core::{AccountId, RegistryConfig, U256};
use launchpad_math::parse_units;
use serde::{Deserialize, Serialize};

use crate::error::{SimulatorError, SimulatorResult};

/// Sell keyword: the seller's whole balance
pub const ALL: &str = "all";
/// Approve keyword: an unlimited allowance
pub const MAX: &str = "max";

/// Scenario configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulatorConfig {
    /// Privileged accounts of the registry
    pub protocol: ProtocolConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Accounts funded with collateral before the first step
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,

    /// Actions executed in order
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProtocolConfig {
    /// May run emergency withdrawals
    pub owner: String,

    /// Receives the protocol fee
    pub fee_recipient: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is unset
    pub level: String,

    /// Emit JSON lines instead of human-readable logs
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccountConfig {
    pub name: String,

    /// Starting collateral in whole units, e.g. "2.5"
    pub collateral: String,
}

/// One scripted action. Amounts are decimal strings in whole units.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepConfig {
    Create {
        /// Label later steps use to refer to the market
        market: String,
        creator: String,
        supply: String,
        #[serde(default)]
        metadata_uri: String,
    },
    Buy {
        market: String,
        account: String,
        collateral: String,
    },
    Sell {
        market: String,
        account: String,
        /// Token amount, or "all"
        tokens: String,
    },
    Approve {
        market: String,
        account: String,
        /// Allowance granted to the market, or "max"
        amount: String,
    },
    Transfer {
        market: String,
        from: String,
        to: String,
        amount: String,
    },
    Withdraw {
        caller: String,
    },
    RandomTrades {
        market: String,
        accounts: Vec<String>,
        count: usize,
        seed: u64,
        /// Upper bound of each random buy
        max_collateral: String,
    },
}

impl StepConfig {
    pub fn action(&self) -> &'static str {
        match self {
            StepConfig::Create { .. } => "create",
            StepConfig::Buy { .. } => "buy",
            StepConfig::Sell { .. } => "sell",
            StepConfig::Approve { .. } => "approve",
            StepConfig::Transfer { .. } => "transfer",
            StepConfig::Withdraw { .. } => "withdraw",
            StepConfig::RandomTrades { .. } => "random_trades",
        }
    }

    /// Label of the market this step targets, if any
    pub fn market(&self) -> Option<&str> {
        match self {
            StepConfig::Create { market, .. }
            | StepConfig::Buy { market, .. }
            | StepConfig::Sell { market, .. }
            | StepConfig::Approve { market, .. }
            | StepConfig::Transfer { market, .. }
            | StepConfig::RandomTrades { market, .. } => Some(market),
            StepConfig::Withdraw { .. } => None,
        }
    }
}

/// Parse a whole-unit decimal string into base units
pub fn parse_amount(field: &str, value: &str) -> SimulatorResult<U256> {
    parse_units(value).map_err(|source| SimulatorError::InvalidAmount {
        field: field.to_string(),
        source,
    })
}

impl SimulatorConfig {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> SimulatorResult<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| SimulatorError::io(path.display().to_string(), e))?;
        let config: SimulatorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> SimulatorResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| SimulatorError::io(path.display().to_string(), e))
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            owner: AccountId::new(self.protocol.owner.clone()),
            protocol_account: AccountId::new(self.protocol.fee_recipient.clone()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SimulatorResult<()> {
        if self.protocol.owner.trim().is_empty() {
            return Err(SimulatorError::invalid("protocol.owner must be non-empty"));
        }
        if self.protocol.fee_recipient.trim().is_empty() {
            return Err(SimulatorError::invalid("protocol.fee_recipient must be non-empty"));
        }

        let mut names = HashSet::new();
        for account in &self.accounts {
            if account.name.trim().is_empty() {
                return Err(SimulatorError::invalid("account name must be non-empty"));
            }
            if !names.insert(account.name.as_str()) {
                return Err(SimulatorError::invalid(format!(
                    "duplicate account: {}",
                    account.name
                )));
            }
            parse_amount(&format!("accounts.{}.collateral", account.name), &account.collateral)?;
        }

        let mut markets = HashSet::new();
        for (index, step) in self.steps.iter().enumerate() {
            let field = |name: &str| format!("steps[{}].{}", index, name);
            let known = |name: &str| -> SimulatorResult<()> {
                if names.contains(name) {
                    Ok(())
                } else {
                    Err(SimulatorError::UnknownAccount(name.to_string()))
                }
            };

            if let StepConfig::Create { market, .. } = step {
                if !markets.insert(market.as_str()) {
                    return Err(SimulatorError::invalid(format!("duplicate market label: {}", market)));
                }
            } else if let Some(market) = step.market() {
                if !markets.contains(market) {
                    return Err(SimulatorError::UnknownMarket(market.to_string()));
                }
            }

            match step {
                StepConfig::Create { creator, supply, .. } => {
                    known(creator)?;
                    parse_amount(&field("supply"), supply)?;
                }
                StepConfig::Buy { account, collateral, .. } => {
                    known(account)?;
                    parse_amount(&field("collateral"), collateral)?;
                }
                StepConfig::Sell { account, tokens, .. } => {
                    known(account)?;
                    if tokens != ALL {
                        parse_amount(&field("tokens"), tokens)?;
                    }
                }
                StepConfig::Approve { account, amount, .. } => {
                    known(account)?;
                    if amount != MAX {
                        parse_amount(&field("amount"), amount)?;
                    }
                }
                StepConfig::Transfer { from, amount, .. } => {
                    known(from)?;
                    parse_amount(&field("amount"), amount)?;
                }
                // Any caller may try; non-owners are rejected at run time
                StepConfig::Withdraw { .. } => {}
                StepConfig::RandomTrades { accounts, count, max_collateral, .. } => {
                    if accounts.is_empty() {
                        return Err(SimulatorError::invalid(format!(
                            "{} needs at least one account",
                            field("accounts")
                        )));
                    }
                    for account in accounts {
                        known(account)?;
                    }
                    if *count == 0 {
                        return Err(SimulatorError::invalid(format!("{} must be greater than 0", field("count"))));
                    }
                    let max = parse_amount(&field("max_collateral"), max_collateral)?;
                    if max == U256::ZERO || max > U256::new(u128::MAX) {
                        return Err(SimulatorError::invalid(format!(
                            "{} must be positive and fit in 128 bits",
                            field("max_collateral")
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            protocol: ProtocolConfig {
                owner: "owner".to_string(),
                fee_recipient: "protocol".to_string(),
            },
            logging: LoggingConfig::default(),
            accounts: vec![],
            steps: vec![],
        }
    }
}

/// Example scenario: one launch, a few trades, and a graduation attempt
pub fn example_config() -> SimulatorConfig {
    let account = |name: &str, collateral: &str| AccountConfig {
        name: name.to_string(),
        collateral: collateral.to_string(),
    };
    let market = "moon".to_string();

    SimulatorConfig {
        accounts: vec![
            account("creator", "0"),
            account("alice", "1000"),
            account("bob", "250.5"),
        ],
        steps: vec![
            StepConfig::Create {
                market: market.clone(),
                creator: "creator".to_string(),
                supply: "1000000".to_string(),
                metadata_uri: "ipfs://moon".to_string(),
            },
            StepConfig::Buy {
                market: market.clone(),
                account: "alice".to_string(),
                collateral: "100".to_string(),
            },
            StepConfig::Buy {
                market: market.clone(),
                account: "bob".to_string(),
                collateral: "25".to_string(),
            },
            StepConfig::Approve {
                market: market.clone(),
                account: "bob".to_string(),
                amount: MAX.to_string(),
            },
            StepConfig::Sell {
                market: market.clone(),
                account: "bob".to_string(),
                tokens: ALL.to_string(),
            },
            StepConfig::RandomTrades {
                market,
                accounts: vec!["alice".to_string(), "bob".to_string()],
                count: 20,
                seed: 7,
                max_collateral: "5".to_string(),
            },
            StepConfig::Withdraw {
                caller: "alice".to_string(),
            },
        ],
        ..SimulatorConfig::default()
    }
}

/// Create example configuration file
pub fn write_example(path: impl AsRef<Path>) -> SimulatorResult<()> {
    example_config().save(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let mut config = example_config();
        assert!(config.validate().is_ok());

        config.protocol.owner = " ".to_string();
        assert!(matches!(config.validate(), Err(SimulatorError::InvalidConfig(_))));
    }

    #[test]
    fn test_duplicate_accounts_rejected() {
        let mut config = example_config();
        config.accounts.push(AccountConfig {
            name: "alice".to_string(),
            collateral: "1".to_string(),
        });
        assert!(matches!(config.validate(), Err(SimulatorError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_references_rejected() {
        let mut config = example_config();
        config.steps.push(StepConfig::Buy {
            market: "moon".to_string(),
            account: "carol".to_string(),
            collateral: "1".to_string(),
        });
        assert!(matches!(config.validate(), Err(SimulatorError::UnknownAccount(name)) if name == "carol"));

        let mut config = example_config();
        config.steps.insert(
            0,
            StepConfig::Buy {
                market: "moon".to_string(),
                account: "alice".to_string(),
                collateral: "1".to_string(),
            },
        );
        assert!(matches!(config.validate(), Err(SimulatorError::UnknownMarket(_))));
    }

    #[test]
    fn test_bad_amount_rejected() {
        let mut config = example_config();
        config.accounts[1].collateral = "1.2.3".to_string();
        assert!(matches!(config.validate(), Err(SimulatorError::InvalidAmount { .. })));
    }

    #[test]
    fn test_parse_toml_steps() {
        let config: SimulatorConfig = toml::from_str(
            r#"
            [protocol]
            owner = "root"
            fee_recipient = "fees"

            [[accounts]]
            name = "alice"
            collateral = "10"

            [[steps]]
            action = "create"
            market = "m"
            creator = "alice"
            supply = "1000"

            [[steps]]
            action = "buy"
            market = "m"
            account = "alice"
            collateral = "0.5"
            "#,
        )
        .unwrap();

        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(config.steps.len(), 2);
        assert_eq!(config.steps[1].action(), "buy");
        assert!(config.validate().is_ok());
        assert_eq!(config.registry_config().owner, AccountId::from("root"));
    }
}
