//! Executes a scripted scenario against an in-memory registry.
//!
//! A failing step is recorded in the report and the run moves on to the next
//! one, so a single script can exercise both happy paths and rejections.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use launchpad_core::{
    AccountId, Event, EventLog, InMemoryLedgerFactory, InMemoryTreasury, LaunchpadError,
    MarketId, MarketInfo, MarketRegistry, Treasury, U256,
};
use launchpad_math::{format_units, mul_div, serde_decimal, to_u128};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{parse_amount, SimulatorConfig, StepConfig, ALL, MAX};
use crate::error::{SimulatorError, SimulatorResult};

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Ok { detail: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub action: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, StepStatus::Ok { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketSummary {
    pub label: String,
    #[serde(with = "serde_decimal")]
    pub price: U256,
    pub info: MarketInfo,
}

/// Collateral held by one account at the end of the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBalance {
    pub name: String,
    #[serde(with = "serde_decimal")]
    pub collateral: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub steps: Vec<StepOutcome>,
    pub markets: Vec<MarketSummary>,
    pub balances: Vec<AccountBalance>,
    #[serde(with = "serde_decimal")]
    pub pool_balance: U256,
    pub events: Vec<Event>,
}

impl ScenarioReport {
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|step| !step.is_ok()).count()
    }

    /// Write the event log as a JSON array
    pub fn write_events_json(&self, path: impl AsRef<Path>) -> SimulatorResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.events)?;
        fs::write(path, json).map_err(|e| SimulatorError::io(path.display().to_string(), e))
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Steps ({} failed):", self.failures())?;
        for step in &self.steps {
            match &step.status {
                StepStatus::Ok { detail } => {
                    writeln!(f, "  [{:>3}] {:<14} ok      {}", step.index, step.action, detail)?
                }
                StepStatus::Failed { error } => {
                    writeln!(f, "  [{:>3}] {:<14} FAILED  {}", step.index, step.action, error)?
                }
            }
        }

        writeln!(f, "Markets:")?;
        for market in &self.markets {
            let info = &market.info;
            writeln!(
                f,
                "  {} {} ({:?}): price {}, real collateral {}, undistributed {}",
                market.label,
                info.market_id,
                info.status(),
                format_units(market.price),
                format_units(info.reserves.real_collateral),
                format_units(info.reserves.real_asset)
            )?;
        }

        writeln!(f, "Collateral:")?;
        for balance in &self.balances {
            writeln!(f, "  {:<14} {}", balance.name, format_units(balance.collateral))?;
        }
        writeln!(f, "  {:<14} {}", "(pool)", format_units(self.pool_balance))?;
        write!(f, "Events: {}", self.events.len())
    }
}

pub struct ScenarioRunner {
    config: SimulatorConfig,
    registry: MarketRegistry,
    treasury: Arc<InMemoryTreasury>,
    events: Arc<EventLog>,
    markets: HashMap<String, MarketId>,
    /// Market labels in creation order
    labels: Vec<String>,
}

impl ScenarioRunner {
    /// Build the registry and fund every configured account
    pub fn new(config: SimulatorConfig) -> SimulatorResult<Self> {
        config.validate()?;

        let treasury = Arc::new(InMemoryTreasury::new());
        for account in &config.accounts {
            let amount = parse_amount(&account.name, &account.collateral)?;
            treasury
                .fund(&AccountId::new(account.name.clone()), amount)
                .map_err(LaunchpadError::from)?;
        }

        let events = Arc::new(EventLog::new());
        let registry = MarketRegistry::new(
            config.registry_config(),
            treasury.clone(),
            events.clone(),
            Box::new(InMemoryLedgerFactory),
        );

        Ok(Self {
            config,
            registry,
            treasury,
            events,
            markets: HashMap::new(),
            labels: Vec::new(),
        })
    }

    pub fn registry(&self) -> &MarketRegistry {
        &self.registry
    }

    /// Run every step in order and collect the report
    pub fn run(mut self) -> SimulatorResult<ScenarioReport> {
        let steps = std::mem::take(&mut self.config.steps);
        info!("Running scenario with {} steps", steps.len());

        let mut outcomes = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let status = match self.execute(step) {
                Ok(detail) => {
                    debug!("Step {} ({}) ok: {}", index, step.action(), detail);
                    StepStatus::Ok { detail }
                }
                Err(e) => {
                    // Keep going: later steps may not depend on this one
                    warn!("Step {} ({}) failed: {}", index, step.action(), e);
                    StepStatus::Failed { error: e.to_string() }
                }
            };
            outcomes.push(StepOutcome {
                index,
                action: step.action().to_string(),
                status,
            });
        }

        self.report(outcomes)
    }

    fn report(&self, steps: Vec<StepOutcome>) -> SimulatorResult<ScenarioReport> {
        let mut markets = Vec::with_capacity(self.labels.len());
        for label in &self.labels {
            let market_id = self.market_id(label)?;
            markets.push(MarketSummary {
                label: label.clone(),
                price: self.registry.price(market_id)?,
                info: self.registry.market(market_id)?,
            });
        }

        let mut names: Vec<String> = self.config.accounts.iter().map(|a| a.name.clone()).collect();
        for extra in [&self.config.protocol.owner, &self.config.protocol.fee_recipient] {
            if !names.contains(extra) {
                names.push(extra.clone());
            }
        }
        let balances = names
            .into_iter()
            .map(|name| {
                let collateral = self.treasury.balance_of(&AccountId::new(name.clone()));
                AccountBalance { name, collateral }
            })
            .collect();

        Ok(ScenarioReport {
            steps,
            markets,
            balances,
            pool_balance: self.treasury.pool_balance(),
            events: self.events.events(),
        })
    }

    fn market_id(&self, label: &str) -> SimulatorResult<MarketId> {
        self.markets
            .get(label)
            .copied()
            .ok_or_else(|| SimulatorError::UnknownMarket(label.to_string()))
    }

    fn execute(&mut self, step: &StepConfig) -> SimulatorResult<String> {
        match step {
            StepConfig::Create { market, creator, supply, metadata_uri } => {
                let supply = parse_amount("supply", supply)?;
                let market_id =
                    self.registry
                        .create_market(&AccountId::new(creator.clone()), supply, metadata_uri)?;
                self.markets.insert(market.clone(), market_id);
                self.labels.push(market.clone());
                Ok(format!("{} -> {}", market, market_id))
            }
            StepConfig::Buy { market, account, collateral } => {
                let market_id = self.market_id(market)?;
                let amount = parse_amount("collateral", collateral)?;
                let receipt = self
                    .registry
                    .buy(market_id, amount, &AccountId::new(account.clone()))?;
                let mut detail = format!(
                    "{} paid {} for {} tokens",
                    account,
                    format_units(amount),
                    format_units(receipt.token_amount)
                );
                if receipt.graduated {
                    detail.push_str(", market graduated");
                }
                Ok(detail)
            }
            StepConfig::Sell { market, account, tokens } => {
                let market_id = self.market_id(market)?;
                let seller = AccountId::new(account.clone());
                let amount = if tokens == ALL {
                    self.registry.asset_balance(market_id, &seller)?
                } else {
                    parse_amount("tokens", tokens)?
                };
                let receipt = self.registry.sell(market_id, amount, &seller)?;
                Ok(format!(
                    "{} sold {} tokens for {}",
                    account,
                    format_units(amount),
                    format_units(receipt.proceeds())
                ))
            }
            StepConfig::Approve { market, account, amount } => {
                let market_id = self.market_id(market)?;
                let allowance = if amount == MAX {
                    U256::MAX
                } else {
                    parse_amount("amount", amount)?
                };
                self.registry.approve(
                    market_id,
                    &AccountId::new(account.clone()),
                    &market_id.account(),
                    allowance,
                )?;
                Ok(format!("{} approved {} for {}", account, market, amount))
            }
            StepConfig::Transfer { market, from, to, amount } => {
                let market_id = self.market_id(market)?;
                let value = parse_amount("amount", amount)?;
                self.registry.transfer_asset(
                    market_id,
                    &AccountId::new(from.clone()),
                    &AccountId::new(to.clone()),
                    value,
                )?;
                Ok(format!("{} sent {} tokens to {}", from, amount, to))
            }
            StepConfig::Withdraw { caller } => {
                let swept = self.registry.emergency_withdraw(&AccountId::new(caller.clone()))?;
                Ok(format!("{} swept {}", caller, format_units(swept)))
            }
            StepConfig::RandomTrades { market, accounts, count, seed, max_collateral } => {
                let market_id = self.market_id(market)?;
                let max = to_u128(parse_amount("max_collateral", max_collateral)?)
                    .map_err(|source| SimulatorError::InvalidAmount {
                        field: "max_collateral".to_string(),
                        source,
                    })?;
                self.random_trades(market_id, accounts, *count, *seed, max)
            }
        }
    }

    /// Alternate buys and sells from randomly picked accounts. Each account
    /// grants the market an unlimited allowance first.
    fn random_trades(
        &self,
        market_id: MarketId,
        accounts: &[String],
        count: usize,
        seed: u64,
        max_collateral: u128,
    ) -> SimulatorResult<String> {
        let traders: Vec<AccountId> = accounts.iter().map(|a| AccountId::new(a.clone())).collect();
        for trader in &traders {
            self.registry
                .approve(market_id, trader, &market_id.account(), U256::MAX)?;
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let (mut succeeded, mut failed) = (0usize, 0usize);
        for i in 0..count {
            let trader = &traders[rng.gen_range(0..traders.len())];
            let result = if i % 2 == 0 {
                let amount = U256::new(rng.gen_range(1..=max_collateral));
                self.registry.buy(market_id, amount, trader)
            } else {
                let held = self.registry.asset_balance(market_id, trader)?;
                let percent = rng.gen_range(1u128..=100);
                let amount = mul_div(held, U256::new(percent), U256::new(100))
                    .map_err(LaunchpadError::from)?;
                self.registry.sell(market_id, amount, trader)
            };

            match result {
                Ok(_) => succeeded += 1,
                // Inactive markets stay inactive; nothing later can succeed
                Err(LaunchpadError::MarketInactive(_)) => {
                    failed += count - i;
                    break;
                }
                Err(e) => {
                    debug!("Random trade {} by {} rejected: {}", i, trader, e);
                    failed += 1;
                }
            }
        }

        Ok(format!("{} trades ok, {} rejected", succeeded, failed))
    }
}
