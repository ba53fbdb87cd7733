//! Module: executor::aggregate
//! Responsibility: inline aggregation fused into a scan.
//! Does not own: row filtering before aggregation (the scan's postfilter).
//! Boundary: the scan only sees the `InlineAggregate` contract.

mod accumulator;
mod group;
mod hash;
mod serial;


use crate::{
    db::{
        executor::progress::ProgressMonitorProxy,
        plan::{AggregateNode, AggregateStrategy},
        schema::TupleSchema,
        table::TableHandle,
        tuple::Tuple,
    },
    error::InternalError,
    value::Value,
};
use std::rc::Rc;

pub use hash::HashAggregate;
pub use serial::SerialAggregate;

///
/// FoldControl
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FoldControl {
    Continue,
    Break,
}

///
/// InlineAggregate
///
/// Aggregation stage driven by a scan loop.
///
/// Call order per execution is `init`, `feed` once per qualifying row,
/// then `finish` exactly once, also when no row qualified. `init` starts a
/// fresh run: state left by a run that never reached `finish` (the driver
/// returned an error mid-scan) is discarded. `feed` returning
/// `Break` means the aggregate's own output limit is satisfied and the
/// driver should stop pulling rows.
///

pub trait InlineAggregate {
    /// Bind parameters and output; returns a scratch tuple shaped to
    /// `input_schema`.
    fn init(
        &mut self,
        params: &[Value],
        progress: &ProgressMonitorProxy,
        input_schema: Rc<TupleSchema>,
        output: TableHandle,
    ) -> Result<Tuple, InternalError>;

    fn feed(&mut self, tuple: &Tuple) -> Result<FoldControl, InternalError>;

    /// Flush pending groups into the output table.
    fn finish(&mut self) -> Result<(), InternalError>;
}

/// Select the aggregate implementation for one plan node.
#[must_use]
pub fn inline_aggregate_executor(node: &AggregateNode) -> Box<dyn InlineAggregate + '_> {
    match node.strategy {
        AggregateStrategy::Serial => Box::new(SerialAggregate::new(node)),
        AggregateStrategy::Partial { sorted_prefix } => {
            Box::new(HashAggregate::partial(node, sorted_prefix))
        }
        AggregateStrategy::Hash => Box::new(HashAggregate::new(node)),
    }
}
