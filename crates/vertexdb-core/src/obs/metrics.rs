use serde::Serialize;
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for scan operations.
///

#[derive(Clone, Debug, Default, Serialize)]
pub(crate) struct EventState {
    pub(crate) ops: ScanOps,
    pub(crate) graphs: BTreeMap<String, GraphCounters>,
}

///
/// ScanOps
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ScanOps {
    // Executor entrypoints
    pub scan_calls: u64,
    pub empty_scans: u64,
    pub pass_through_scans: u64,

    // Rows touched
    pub rows_scanned: u64,
    pub rows_emitted: u64,

    // Remote probe
    pub remote_probes: u64,
    pub remote_probe_failures: u64,
}

///
/// GraphCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct GraphCounters {
    pub scan_calls: u64,
    pub rows_scanned: u64,
    pub rows_emitted: u64,
}

///
/// EventReport
/// Point-in-time copy of the metrics state.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub ops: ScanOps,
    pub graphs: BTreeMap<String, GraphCounters>,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

#[must_use]
pub(crate) fn report() -> EventReport {
    with_state(|m| EventReport {
        ops: m.ops.clone(),
        graphs: m.graphs.clone(),
    })
}
