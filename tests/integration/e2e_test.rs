//! End-to-end integration tests

use crate::common::{month_ends, store};
use approx::assert_relative_eq;
use pit_backtest::analytics::{Benchmark, MetricsConfig};
use pit_backtest::backtest::{AllocationVector, BacktestError, Backtester, SimulationConfig};
use pit_backtest::config::Config;
use pit_backtest::panel::{PanelStore, PriceEntry, RatioEntry};
use pit_backtest::strategy::{self, Endpoints, Momentum, Strategy};

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    config.validate().unwrap();
    assert_eq!(config.simulation.n_prices, 3);
    assert_eq!(config.metrics.benchmark, Some(Benchmark::EqualWeight));
}

#[test]
fn test_single_entity_monthly_scenario() {
    let m = month_ends(4);
    let rets = [0.01, 0.02, -0.01, 0.03];
    let prices = m
        .iter()
        .zip(rets)
        .map(|(d, ret)| PriceEntry {
            entity_id: "X".to_string(),
            date: *d,
            ret,
        })
        .collect();
    let ratios = m
        .iter()
        .map(|d| RatioEntry {
            entity_id: "X".to_string(),
            date: *d,
            features: vec![1.0],
        })
        .collect();
    let store = PanelStore::new(prices, ratios, vec!["pe".to_string()]).unwrap();
    let mut bt = Backtester::new(store, MetricsConfig::default()).unwrap();

    let all_in = strategy::from_fn(|_| Ok([("X".to_string(), 1.0)].into_iter().collect()));
    let (investments, results) = bt.run(&all_in, 1, 1, 1).unwrap();

    let pairs: Vec<_> = investments.iter().map(|p| (p.buy_date, p.sell_date)).collect();
    assert_eq!(pairs, vec![(m[1], m[2]), (m[2], m[3])]);
    assert_eq!(results.points(), &[(m[2], -0.01), (m[3], 0.03)]);
}

#[test]
fn test_momentum_run_end_to_end() {
    let mut bt = Backtester::new(
        store(12),
        MetricsConfig {
            rolling_window: 3,
            benchmark: Some(Benchmark::EqualWeight),
            ..Default::default()
        },
    )
    .unwrap();

    let momentum = Momentum::new(2);
    let run = bt
        .rolling_test(&momentum, SimulationConfig::new(3, 1, 1))
        .unwrap()
        .clone();

    let m = month_ends(12);
    assert_eq!(run.strategy, "momentum");
    assert_eq!(run.rebalance_dates, m[3..].to_vec());
    assert_eq!(run.investments.len(), run.rebalance_dates.len() - 1);
    assert!(run
        .investments
        .iter()
        .all(|p| p.allocations.len() <= 2 && p.buy_date < p.sell_date));

    // Each holding period contributes exactly its sell date in a monthly universe
    assert_eq!(run.results.dates().collect::<Vec<_>>(), m[4..].to_vec());

    let report = bt.metrics().unwrap();
    assert_eq!(report.observations, 8);
    assert!(report.beta.is_some());
    assert_eq!(report.rolling_sharpe.len(), 8);
    assert!(report.max_drawdown <= 0.0);
    assert_relative_eq!(report.total_return, report.final_level() - 1.0, epsilon = 1e-12);
}

#[test]
fn test_results_recompute_from_investments() {
    let mut bt = Backtester::new(store(12), MetricsConfig::default()).unwrap();
    bt.run(&Endpoints, 2, 2, 2).unwrap();

    let investments = bt.investments().unwrap().to_vec();
    let recomputed = pit_backtest::backtest::aggregate(&investments, bt.returns()).unwrap();
    assert_eq!(&recomputed, bt.results().unwrap());
}

#[test]
fn test_stride_three_holding_periods_span_three_months() {
    let mut bt = Backtester::new(store(12), MetricsConfig::default()).unwrap();
    let (investments, results) = bt.run(&Endpoints, 1, 1, 3).unwrap();
    let m = month_ends(12);

    let pairs: Vec<_> = investments.iter().map(|p| (p.buy_date, p.sell_date)).collect();
    assert_eq!(pairs, vec![(m[1], m[4]), (m[4], m[7]), (m[7], m[10])]);
    assert_eq!(results.len(), 9);
}

#[test]
fn test_parallel_run_matches_sequential() {
    let momentum = Momentum::new(3);
    let mut bt = Backtester::new(store(12), MetricsConfig::default()).unwrap();

    let sequential = bt
        .rolling_test(&momentum, SimulationConfig::new(2, 2, 1))
        .unwrap()
        .clone();
    let parallel = bt
        .rolling_test(
            &momentum,
            SimulationConfig {
                parallel: true,
                ..SimulationConfig::new(2, 2, 1)
            },
        )
        .unwrap();

    assert_eq!(parallel.investments, sequential.investments);
    assert_eq!(parallel.results, sequential.results);
}

#[test]
fn test_boxed_strategy_from_config() {
    let config: Config = toml::from_str("[strategy]\nkind = \"endpoints\"").unwrap();
    let strategy: Box<dyn Strategy> = config.strategy.build();

    let mut bt = Backtester::new(store(8), config.metrics.clone()).unwrap();
    let run = bt.rolling_test(&*strategy, config.simulation).unwrap();
    assert_eq!(run.strategy, "endpoints");
    assert!(run
        .investments
        .iter()
        .all(|p| (p.allocations.total() - 1.0).abs() < 1e-12));
}

#[test]
fn test_metrics_require_a_run() {
    let bt = Backtester::new(store(6), MetricsConfig::default()).unwrap();
    assert!(matches!(bt.metrics(), Err(BacktestError::NoResults)));
    assert_eq!(
        bt.results().unwrap_err().to_string(),
        "No results available: run a backtest first"
    );
}

#[test]
fn test_allocation_outside_snapshot_rejected() {
    let mut bt = Backtester::new(store(6), MetricsConfig::default()).unwrap();
    let leaky = strategy::from_fn(|_| {
        let mut alloc = AllocationVector::new();
        alloc.insert("ZZZ", 1.0);
        Ok(alloc)
    });
    assert!(matches!(
        bt.run(&leaky, 1, 1, 1),
        Err(BacktestError::MalformedAllocation { .. })
    ));
}
