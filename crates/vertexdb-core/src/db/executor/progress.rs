use std::{cell::Cell, rc::Rc};

///
/// ProgressReporter
///
/// Receives periodic progress updates from long-running operators.
///

pub trait ProgressReporter {
    fn report_progress(&self, plan_node_id: u32, tuples_processed: u64);
}

///
/// ProgressMonitorProxy
///
/// Counts processed tuples for one operator execution and reports every
/// `interval` tuples. Clones share the same countdown, so an inline stage
/// holding a clone keeps reporting against the owning scan.
///

#[derive(Clone)]
pub struct ProgressMonitorProxy {
    reporter: Option<Rc<dyn ProgressReporter>>,
    plan_node_id: u32,
    interval: u64,
    state: Rc<ProgressState>,
}

#[derive(Default)]
struct ProgressState {
    countdown: Cell<u64>,
    processed: Cell<u64>,
}

impl ProgressMonitorProxy {
    #[must_use]
    pub fn new(
        reporter: Option<Rc<dyn ProgressReporter>>,
        plan_node_id: u32,
        interval: u64,
    ) -> Self {
        let interval = interval.max(1);
        let state = ProgressState::default();
        state.countdown.set(interval);

        Self {
            reporter,
            plan_node_id,
            interval,
            state: Rc::new(state),
        }
    }

    /// Count one unit of work, reporting when the countdown expires.
    pub fn countdown_progress(&self) {
        let processed = self.state.processed.get().saturating_add(1);
        self.state.processed.set(processed);

        let remaining = self.state.countdown.get().saturating_sub(1);
        if remaining > 0 {
            self.state.countdown.set(remaining);
            return;
        }

        self.state.countdown.set(self.interval);
        if let Some(reporter) = &self.reporter {
            reporter.report_progress(self.plan_node_id, processed);
        }
    }

    #[must_use]
    pub fn processed(&self) -> u64 {
        self.state.processed.get()
    }
}
