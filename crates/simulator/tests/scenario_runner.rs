use launchpad_core::{Event, MarketStatus, U256};
use launchpad_simulator::config::{AccountConfig, StepConfig};
use launchpad_simulator::{example_config, ScenarioRunner, SimulatorConfig, SimulatorError, StepStatus};
use tempfile::TempDir;

const LAUNCH_SCENARIO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/launch.toml");

fn failed_actions(config: SimulatorConfig) -> Vec<(usize, String)> {
    ScenarioRunner::new(config)
        .unwrap()
        .run()
        .unwrap()
        .steps
        .into_iter()
        .filter(|step| !step.is_ok())
        .map(|step| (step.index, step.action))
        .collect()
}

#[test]
fn test_example_config_round_trips_through_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scenario.toml");

    launchpad_simulator::write_example(&path).unwrap();
    let loaded = SimulatorConfig::load(&path).unwrap();
    assert_eq!(loaded, example_config());
}

#[test]
fn test_load_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = SimulatorConfig::load(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, SimulatorError::Io { .. }));
}

#[test]
fn test_load_rejects_invalid_scenario() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        r#"
        [protocol]
        owner = "owner"
        fee_recipient = "protocol"

        [[steps]]
        action = "withdraw"
        caller = "owner"

        [[steps]]
        action = "sell"
        market = "ghost"
        account = "owner"
        tokens = "all"
        "#,
    )
    .unwrap();

    assert!(matches!(
        SimulatorConfig::load(&path),
        Err(SimulatorError::UnknownMarket(label)) if label == "ghost"
    ));
}

#[test]
fn test_example_scenario_runs() {
    let report = ScenarioRunner::new(example_config()).unwrap().run().unwrap();

    // Only the withdraw by a non-owner is rejected
    assert_eq!(report.failures(), 1);
    let last = report.steps.last().unwrap();
    assert_eq!(last.action, "withdraw");
    assert!(matches!(&last.status, StepStatus::Failed { error } if error.contains("alice is not authorized")));

    assert_eq!(report.markets.len(), 1);
    let market = &report.markets[0];
    assert_eq!(market.label, "moon");
    assert_eq!(market.info.status(), MarketStatus::Active);
    assert!(market.price > U256::new(69_420_000_000_000_000_000));
    assert!(matches!(report.events[0], Event::MarketCreated { .. }));
    assert!(market.info.reserves.real_collateral <= report.pool_balance);
}

#[test]
fn test_launch_scenario_graduates() {
    let config = SimulatorConfig::load(LAUNCH_SCENARIO).unwrap();
    let report = ScenarioRunner::new(config).unwrap().run().unwrap();

    let failed: Vec<_> = report
        .steps
        .iter()
        .filter(|step| !step.is_ok())
        .map(|step| step.index)
        .collect();
    assert_eq!(failed, vec![7, 9]);

    match &report.steps[8].status {
        StepStatus::Ok { detail } => assert!(detail.ends_with("market graduated")),
        other => panic!("whale buy failed: {:?}", other),
    }

    let market = &report.markets[0].info;
    assert_eq!(market.status(), MarketStatus::Graduated);
    assert!(market.graduated_at.is_some());
    assert!(report
        .events
        .iter()
        .any(|event| matches!(event, Event::MarketGraduated { .. })));

    // The owner swept the pool last
    assert_eq!(report.pool_balance, U256::ZERO);
    let owner = report.balances.iter().find(|b| b.name == "owner").unwrap();
    assert!(owner.collateral > U256::ZERO);
}

#[test]
fn test_random_trades_are_reproducible() {
    let run = || {
        ScenarioRunner::new(example_config())
            .unwrap()
            .run()
            .unwrap()
            .events
    };
    assert_eq!(run(), run());
}

#[test]
fn test_failures_do_not_stop_the_run() {
    let mut config = example_config();
    config.accounts.push(AccountConfig {
        name: "dave".to_string(),
        collateral: "0".to_string(),
    });
    config.steps.insert(
        1,
        StepConfig::Buy {
            market: "moon".to_string(),
            account: "dave".to_string(),
            collateral: "1".to_string(),
        },
    );

    let failed = failed_actions(config);
    assert_eq!(failed, vec![(1, "buy".to_string()), (7, "withdraw".to_string())]);
}

#[test]
fn test_events_json_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.json");
    let report = ScenarioRunner::new(example_config()).unwrap().run().unwrap();
    report.write_events_json(&path).unwrap();

    let written: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written.len(), report.events.len());
    assert_eq!(written[0]["event"], "MarketCreated");
    assert_eq!(written[0]["total_supply"], "1000000000000000000000000");
}
