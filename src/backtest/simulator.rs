//! Rolling simulation engine

use super::{
    aggregate, AllocationVector, BacktestError, HoldingPeriod, ReturnPanel, ReturnSeries,
    SimulationConfig,
};
use crate::analytics::{MetricsConfig, MetricsEngine, MetricsReport};
use crate::panel::{PanelStore, SnapshotSummary};
use crate::strategy::Strategy;
use crate::telemetry::{self, CounterMetric, LatencyMetric, ValueMetric};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// One completed rolling simulation
#[derive(Debug, Clone, Serialize)]
pub struct BacktestRun {
    pub run_id: Uuid,
    /// Name reported by the strategy
    pub strategy: String,
    pub config: SimulationConfig,
    /// Dates the strategy was invoked on, ascending
    pub rebalance_dates: Vec<NaiveDate>,
    pub investments: Vec<HoldingPeriod>,
    pub results: ReturnSeries,
    /// Composition of the snapshot seen on the final rebalance date
    pub last_snapshot: Option<SnapshotSummary>,
}

struct Decision {
    date: NaiveDate,
    allocations: AllocationVector,
    snapshot: SnapshotSummary,
}

/// Drives a strategy across the date universe of a panel store
///
/// The store is never mutated; only the most recent completed run is kept.
pub struct Backtester {
    store: PanelStore,
    returns: ReturnPanel,
    metrics: MetricsEngine,
    last_run: Option<BacktestRun>,
}

impl Backtester {
    pub fn new(store: PanelStore, metrics: MetricsConfig) -> Result<Self, BacktestError> {
        metrics.validate()?;
        let returns = ReturnPanel::from_prices(store.prices());
        Ok(Self {
            store,
            returns,
            metrics: MetricsEngine::new(metrics),
            last_run: None,
        })
    }

    pub fn store(&self) -> &PanelStore {
        &self.store
    }

    pub fn returns(&self) -> &ReturnPanel {
        &self.returns
    }

    /// Universe dates from the lookback offset onward, every `frequency`-th one
    pub fn rebalance_dates(&self, config: &SimulationConfig) -> Vec<NaiveDate> {
        self.store
            .universe()
            .rebalance_dates(config.start_offset(), config.frequency)
    }

    /// Simulate with explicit lookbacks and stride, returning `(investments, results)`
    pub fn run<S>(
        &mut self,
        strategy: &S,
        n_prices: usize,
        n_ratios: usize,
        frequency: usize,
    ) -> Result<(&[HoldingPeriod], &ReturnSeries), BacktestError>
    where
        S: Strategy + ?Sized,
    {
        let run = self.rolling_test(strategy, SimulationConfig::new(n_prices, n_ratios, frequency))?;
        Ok((&run.investments, &run.results))
    }

    /// Run a full rolling simulation and keep it as the latest result
    pub fn rolling_test<S>(
        &mut self,
        strategy: &S,
        config: SimulationConfig,
    ) -> Result<&BacktestRun, BacktestError>
    where
        S: Strategy + ?Sized,
    {
        self.rolling_test_until(strategy, config, &AtomicBool::new(false))
    }

    /// Like [`Backtester::rolling_test`], aborting once `cancel` is set
    ///
    /// A failed or interrupted run leaves the previous result in place.
    pub fn rolling_test_until<S>(
        &mut self,
        strategy: &S,
        config: SimulationConfig,
        cancel: &AtomicBool,
    ) -> Result<&BacktestRun, BacktestError>
    where
        S: Strategy + ?Sized,
    {
        config.validate()?;

        let run_id = Uuid::new_v4();
        let span = info_span!("rolling_test", %run_id, strategy = strategy.name());
        let _guard = span.enter();

        let start = Instant::now();
        let dates = self.rebalance_dates(&config);
        info!(
            rebalances = dates.len(),
            n_prices = config.n_prices,
            n_ratios = config.n_ratios,
            frequency = config.frequency,
            parallel = config.parallel,
            "Starting rolling simulation"
        );

        let decide = |date: &NaiveDate| self.decide(strategy, *date, &config, cancel);
        let decisions: Vec<Decision> = if config.parallel {
            dates.par_iter().map(decide).collect::<Result<_, _>>()?
        } else {
            dates.iter().map(decide).collect::<Result<_, _>>()?
        };

        let last_snapshot = decisions.last().map(|d| d.snapshot.clone());
        let investments = HoldingPeriod::from_decisions(
            decisions
                .into_iter()
                .map(|d| (d.date, d.allocations))
                .collect(),
        );
        let results = aggregate(&investments, &self.returns)?;

        telemetry::record_latency(LatencyMetric::Run, start.elapsed());
        info!(
            periods = investments.len(),
            observations = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rolling simulation complete"
        );

        Ok(self.last_run.insert(BacktestRun {
            run_id,
            strategy: strategy.name().to_string(),
            config,
            rebalance_dates: dates,
            investments,
            results,
            last_snapshot,
        }))
    }

    fn decide<S>(
        &self,
        strategy: &S,
        date: NaiveDate,
        config: &SimulationConfig,
        cancel: &AtomicBool,
    ) -> Result<Decision, BacktestError>
    where
        S: Strategy + ?Sized,
    {
        if cancel.load(Ordering::Relaxed) {
            return Err(BacktestError::Interrupted);
        }

        let started = Instant::now();
        let snapshot = self.store.snapshot(date, config.n_prices, config.n_ratios);
        telemetry::record_latency(LatencyMetric::Snapshot, started.elapsed());
        telemetry::increment(CounterMetric::Rebalances);

        let entities = snapshot.entities();
        telemetry::record_value(ValueMetric::SnapshotEntities, entities.len() as f64);
        if entities.is_empty() {
            telemetry::increment(CounterMetric::EmptySnapshots);
            warn!(%date, "Snapshot has no entities");
        }

        let started = Instant::now();
        let allocations = strategy
            .allocate(&snapshot)
            .map_err(|source| BacktestError::Strategy { date, source })?;
        telemetry::record_latency(LatencyMetric::Strategy, started.elapsed());

        for (entity_id, weight) in allocations.iter() {
            if !weight.is_finite() {
                return Err(BacktestError::MalformedAllocation {
                    date,
                    reason: format!("weight for {entity_id} is {weight}"),
                });
            }
            if !entities.contains(entity_id) {
                return Err(BacktestError::MalformedAllocation {
                    date,
                    reason: format!("{entity_id} is not in the snapshot"),
                });
            }
        }

        let held = allocations.iter().filter(|(_, w)| *w != 0.0).count();
        telemetry::record_value(ValueMetric::AllocatedEntities, held as f64);
        debug!(%date, entities = entities.len(), allocated = held, "Rebalanced");

        Ok(Decision {
            date,
            allocations,
            snapshot: snapshot.summary(),
        })
    }

    /// The most recent completed run
    pub fn last_run(&self) -> Result<&BacktestRun, BacktestError> {
        self.last_run.as_ref().ok_or(BacktestError::NoResults)
    }

    pub fn investments(&self) -> Result<&[HoldingPeriod], BacktestError> {
        Ok(&self.last_run()?.investments)
    }

    pub fn results(&self) -> Result<&ReturnSeries, BacktestError> {
        Ok(&self.last_run()?.results)
    }

    pub fn last_snapshot(&self) -> Result<Option<&SnapshotSummary>, BacktestError> {
        Ok(self.last_run()?.last_snapshot.as_ref())
    }

    /// Metrics of the latest run, against the configured benchmark if any
    pub fn metrics(&self) -> Result<MetricsReport, BacktestError> {
        let results = self.results()?;
        let benchmark = self
            .metrics
            .config()
            .benchmark
            .as_ref()
            .map(|b| b.series(&self.returns));
        Ok(self.metrics.report(results, benchmark.as_ref()))
    }
}
