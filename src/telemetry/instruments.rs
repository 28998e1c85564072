//! Run instrumentation through the `metrics` facade
//!
//! Nothing is exported unless the embedding application installs a recorder.

use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Snapshot assembly for one rebalance date
    Snapshot,
    /// One strategy call
    Strategy,
    /// A complete rolling simulation
    Run,
}

/// Sampled value metric types
#[derive(Debug, Clone, Copy)]
pub enum ValueMetric {
    /// Entities surviving the completeness filters
    SnapshotEntities,
    /// Entities with a non-zero weight
    AllocatedEntities,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Rebalance dates evaluated
    Rebalances,
    /// Rebalance dates whose snapshot had no entities
    EmptySnapshots,
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::Snapshot => "pitbt_snapshot_seconds",
        LatencyMetric::Strategy => "pitbt_strategy_seconds",
        LatencyMetric::Run => "pitbt_run_seconds",
    };

    metrics::histogram!(metric_name).record(duration.as_secs_f64());
}

/// Record a sampled value
pub fn record_value(metric: ValueMetric, value: f64) {
    let metric_name = match metric {
        ValueMetric::SnapshotEntities => "pitbt_snapshot_entities",
        ValueMetric::AllocatedEntities => "pitbt_allocated_entities",
    };

    metrics::histogram!(metric_name).record(value);
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    let metric_name = match metric {
        CounterMetric::Rebalances => "pitbt_rebalances_total",
        CounterMetric::EmptySnapshots => "pitbt_empty_snapshots_total",
    };

    metrics::counter!(metric_name).increment(1);
}
