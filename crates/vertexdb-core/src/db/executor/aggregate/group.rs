//! Group keys, per-group state and the output emitter shared by every
//! inline aggregate strategy.

use crate::{
    db::{
        executor::{
            aggregate::{FoldControl, accumulator::Accumulator},
            postfilter::CountingPostfilter,
            progress::ProgressMonitorProxy,
        },
        expr::{Expr, Expression},
        plan::{AggregateExpr, AggregateKind, AggregateNode},
        table::TableHandle,
        tuple::Tuple,
    },
    error::InternalError,
    value::Value,
};
use std::hash::{Hash, Hasher};

///
/// GroupKey
///
/// Evaluated group-by values of one row. Nulls group together and floats
/// compare by bit pattern so the key is a lawful `Eq + Hash`.
///

#[derive(Clone, Debug)]
pub(super) struct GroupKey(Vec<Value>);

impl GroupKey {
    /// Key of the single group formed when there is no group-by.
    pub(super) const fn empty() -> Self {
        Self(Vec::new())
    }

    pub(super) fn evaluate(group_by: &[Expr], tuple: &Tuple) -> Result<Self, InternalError> {
        let values = group_by
            .iter()
            .map(|expr| expr.eval(tuple))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self(values))
    }

    /// Leading `len` key values.
    pub(super) fn prefix(&self, len: usize) -> Self {
        Self(self.0.iter().take(len).cloned().collect())
    }

    pub(super) fn into_values(self) -> Vec<Value> {
        self.0
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(&other.0)
                .all(|(a, b)| match (a, b) {
                    (Value::Float64(x), Value::Float64(y)) => x.to_bits() == y.to_bits(),
                    _ => a == b,
                })
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for value in &self.0 {
            value.tag().to_u8().hash(state);
            match value {
                Value::Bool(v) => v.hash(state),
                Value::Float64(v) => v.to_bits().hash(state),
                Value::Int(v) => v.hash(state),
                Value::Null => {}
                Value::Text(v) => v.hash(state),
            }
        }
    }
}

///
/// GroupState
///

#[derive(Debug)]
pub(super) struct GroupState {
    key: GroupKey,
    accumulators: Vec<Accumulator>,
}

impl GroupState {
    pub(super) fn new(key: GroupKey, aggregates: &[AggregateExpr]) -> Self {
        Self {
            key,
            accumulators: aggregates
                .iter()
                .map(|agg| Accumulator::for_kind(agg.kind))
                .collect(),
        }
    }

    pub(super) const fn key(&self) -> &GroupKey {
        &self.key
    }

    pub(super) fn update(
        &mut self,
        aggregates: &[AggregateExpr],
        tuple: &Tuple,
    ) -> Result<(), InternalError> {
        for (agg, acc) in aggregates.iter().zip(&mut self.accumulators) {
            let input = match (&agg.kind, &agg.input) {
                (AggregateKind::CountStar, _) => None,
                (_, Some(expr)) => Some(expr.eval(tuple)?),
                (kind, None) => {
                    return Err(InternalError::aggregate_invariant(format!(
                        "{kind:?} aggregate has no input expression"
                    )));
                }
            };
            acc.update(input.as_ref())?;
        }

        Ok(())
    }

    /// Output row: group-by values followed by one column per aggregate.
    fn into_row(self) -> Tuple {
        let mut values = self.key.into_values();
        values.extend(self.accumulators.iter().map(Accumulator::finalize));

        Tuple::new(values)
    }
}

///
/// AggregateEmitter
///
/// Applies `having` and the aggregate's own limit/offset to finished
/// groups and writes survivors into the output table.
///

pub(super) struct AggregateEmitter<'a> {
    output: TableHandle,
    postfilter: CountingPostfilter<'a>,
    progress: ProgressMonitorProxy,
    emitted: usize,
}

impl<'a> AggregateEmitter<'a> {
    pub(super) fn new(
        node: &'a AggregateNode,
        params: &[Value],
        progress: &ProgressMonitorProxy,
        output: TableHandle,
    ) -> Result<Self, InternalError> {
        let (limit, offset) = match &node.limit {
            Some(limit) => limit.resolve(params)?,
            None => (
                CountingPostfilter::NO_LIMIT,
                CountingPostfilter::NO_OFFSET,
            ),
        };
        let having = node.having.as_ref().map(|expr| expr as &dyn Expression);

        Ok(Self {
            output,
            postfilter: CountingPostfilter::new(having, limit, offset),
            progress: progress.clone(),
            emitted: 0,
        })
    }

    /// Emit one finished group. `Break` once the output limit is reached.
    pub(super) fn emit(&mut self, group: GroupState) -> Result<FoldControl, InternalError> {
        if !self.postfilter.is_under_limit() {
            return Ok(FoldControl::Break);
        }

        let row = group.into_row();
        if self.postfilter.eval(&row)? {
            self.output.try_borrow_mut()?.insert_temp_tuple(&row)?;
            self.emitted += 1;
            self.progress.countdown_progress();
        }

        if self.postfilter.is_under_limit() {
            Ok(FoldControl::Continue)
        } else {
            Ok(FoldControl::Break)
        }
    }

    pub(super) const fn emitted(&self) -> usize {
        self.emitted
    }
}

///
/// Lifecycle
///
/// Guards the init → feed* → finish call order.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum Lifecycle {
    Created,
    Running,
    Finished,
}

impl Lifecycle {
    pub(super) fn check_running(self, call: &str) -> Result<(), InternalError> {
        match self {
            Self::Running => Ok(()),
            Self::Created => Err(InternalError::aggregate_invariant(format!(
                "inline aggregate {call} called before init"
            ))),
            Self::Finished => Err(InternalError::aggregate_invariant(format!(
                "inline aggregate {call} called after finish"
            ))),
        }
    }
}
