//! Metrics sink boundary.
//!
//! Executor logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between execution logic
//! and the thread-local metrics state.
use crate::obs::metrics;
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = RefCell::new(None);
}

///
/// ShortCircuit
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShortCircuit {
    EmptyScan,
    PassThrough,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent<'a> {
    ScanStart {
        source: &'a str,
    },
    ScanFinish {
        source: &'a str,
        rows_scanned: u64,
        rows_emitted: u64,
    },
    ScanShortCircuit {
        source: &'a str,
        reason: ShortCircuit,
    },
    RemoteProbe {
        succeeded: bool,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into the metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::ScanStart { source } => {
                metrics::with_state_mut(|m| {
                    m.ops.scan_calls = m.ops.scan_calls.saturating_add(1);
                    let entry = m.graphs.entry(source.to_string()).or_default();
                    entry.scan_calls = entry.scan_calls.saturating_add(1);
                });
            }

            MetricsEvent::ScanFinish {
                source,
                rows_scanned,
                rows_emitted,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.rows_scanned = m.ops.rows_scanned.saturating_add(rows_scanned);
                    m.ops.rows_emitted = m.ops.rows_emitted.saturating_add(rows_emitted);
                    let entry = m.graphs.entry(source.to_string()).or_default();
                    entry.rows_scanned = entry.rows_scanned.saturating_add(rows_scanned);
                    entry.rows_emitted = entry.rows_emitted.saturating_add(rows_emitted);
                });
            }

            MetricsEvent::ScanShortCircuit { reason, .. } => {
                metrics::with_state_mut(|m| match reason {
                    ShortCircuit::EmptyScan => {
                        m.ops.empty_scans = m.ops.empty_scans.saturating_add(1);
                    }
                    ShortCircuit::PassThrough => {
                        m.ops.pass_through_scans = m.ops.pass_through_scans.saturating_add(1);
                    }
                });
            }

            MetricsEvent::RemoteProbe { succeeded } => {
                metrics::with_state_mut(|m| {
                    m.ops.remote_probes = m.ops.remote_probes.saturating_add(1);
                    if !succeeded {
                        m.ops.remote_probe_failures =
                            m.ops.remote_probe_failures.saturating_add(1);
                    }
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // Preconditions:
        // - `ptr` was produced from a valid `&dyn MetricsSink` in `with_metrics_sink`.
        // - `with_metrics_sink` always restores the previous pointer before returning,
        //   including unwind paths via `Guard::drop`.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        //
        // What would break this:
        // - If `with_metrics_sink` failed to restore on all exits (normal + panic),
        //   `ptr` could outlive the borrowed sink and become dangling.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current metrics state for diagnostics and tests.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` always restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists `sink_ptr`.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}

///
/// ScanSpan
/// RAII guard that emits start/finish metrics events for one scan execution.
/// Ensures finish accounting happens even when the scan returns an error.
///

pub(crate) struct ScanSpan {
    source: String,
    rows_scanned: u64,
    rows_emitted: u64,
}

impl ScanSpan {
    #[must_use]
    pub(crate) fn new(source: &str) -> Self {
        record(MetricsEvent::ScanStart { source });

        Self {
            source: source.to_string(),
            rows_scanned: 0,
            rows_emitted: 0,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows_scanned: u64, rows_emitted: u64) {
        self.rows_scanned = rows_scanned;
        self.rows_emitted = rows_emitted;
    }
}

impl Drop for ScanSpan {
    fn drop(&mut self) {
        record(MetricsEvent::ScanFinish {
            source: &self.source,
            rows_scanned: self.rows_scanned,
            rows_emitted: self.rows_emitted,
        });
    }
}
