//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Logging goes through `tracing` directly; this module only owns counters.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventReport, GraphCounters, ScanOps};
pub use sink::{
    MetricsEvent, MetricsSink, ShortCircuit, metrics_report, metrics_reset_all,
    with_metrics_sink,
};
