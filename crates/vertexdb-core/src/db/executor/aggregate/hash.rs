use crate::{
    db::{
        executor::{
            aggregate::{
                FoldControl, InlineAggregate,
                group::{AggregateEmitter, GroupKey, GroupState, Lifecycle},
            },
            progress::ProgressMonitorProxy,
        },
        plan::AggregateNode,
        schema::TupleSchema,
        table::TableHandle,
        tuple::Tuple,
    },
    error::InternalError,
    value::Value,
};
use std::{collections::HashMap, rc::Rc};

///
/// HashAggregate
///
/// Groups rows in a hash table and emits them in first-seen order.
///
/// With `sorted_prefix > 0` (partial aggregation) the input is ordered on
/// the leading `sorted_prefix` group-by keys: the table only holds the
/// groups of the current prefix run and is flushed when the prefix
/// changes. With `sorted_prefix == 0` everything is emitted at finish.
///

pub struct HashAggregate<'a> {
    node: &'a AggregateNode,
    sorted_prefix: usize,
    lifecycle: Lifecycle,
    emitter: Option<AggregateEmitter<'a>>,
    run_prefix: Option<GroupKey>,
    index: HashMap<GroupKey, usize>,
    groups: Vec<GroupState>,
}

impl<'a> HashAggregate<'a> {
    #[must_use]
    pub fn new(node: &'a AggregateNode) -> Self {
        Self::partial(node, 0)
    }

    #[must_use]
    pub fn partial(node: &'a AggregateNode, sorted_prefix: usize) -> Self {
        Self {
            node,
            sorted_prefix: sorted_prefix.min(node.group_by.len()),
            lifecycle: Lifecycle::Created,
            emitter: None,
            run_prefix: None,
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    // Emit every buffered group in first-seen order.
    fn flush(&mut self) -> Result<FoldControl, InternalError> {
        let emitter = self
            .emitter
            .as_mut()
            .ok_or_else(|| InternalError::aggregate_invariant("hash aggregate has no emitter"))?;

        self.index.clear();
        for group in self.groups.drain(..) {
            if emitter.emit(group)? == FoldControl::Break {
                return Ok(FoldControl::Break);
            }
        }

        Ok(FoldControl::Continue)
    }

    const fn strategy_label(&self) -> &'static str {
        if self.sorted_prefix == 0 {
            "hash"
        } else {
            "partial"
        }
    }
}

impl InlineAggregate for HashAggregate<'_> {
    fn init(
        &mut self,
        params: &[Value],
        progress: &ProgressMonitorProxy,
        input_schema: Rc<TupleSchema>,
        output: TableHandle,
    ) -> Result<Tuple, InternalError> {
        if self.lifecycle == Lifecycle::Running {
            tracing::debug!(
                strategy = self.strategy_label(),
                groups = self.groups.len(),
                "discarding unfinished inline aggregate run"
            );
        }
        self.run_prefix = None;
        self.index.clear();
        self.groups.clear();
        self.emitter = Some(AggregateEmitter::new(self.node, params, progress, output)?);
        self.lifecycle = Lifecycle::Running;

        Ok(Tuple::nulls(input_schema.column_count()))
    }

    fn feed(&mut self, tuple: &Tuple) -> Result<FoldControl, InternalError> {
        self.lifecycle.check_running("feed")?;
        let key = GroupKey::evaluate(&self.node.group_by, tuple)?;

        if self.sorted_prefix > 0 {
            let prefix = key.prefix(self.sorted_prefix);
            if self.run_prefix.as_ref().is_some_and(|run| *run != prefix)
                && self.flush()? == FoldControl::Break
            {
                return Ok(FoldControl::Break);
            }
            self.run_prefix = Some(prefix);
        }

        let slot = match self.index.get(&key) {
            Some(slot) => *slot,
            None => {
                let slot = self.groups.len();
                self.groups
                    .push(GroupState::new(key.clone(), &self.node.aggregates));
                self.index.insert(key, slot);
                slot
            }
        };
        let group = self.groups.get_mut(slot).ok_or_else(|| {
            InternalError::aggregate_invariant(format!("hash aggregate lost group slot {slot}"))
        })?;
        group.update(&self.node.aggregates, tuple)?;

        Ok(FoldControl::Continue)
    }

    fn finish(&mut self) -> Result<(), InternalError> {
        self.lifecycle.check_running("finish")?;
        self.lifecycle = Lifecycle::Finished;

        // No group-by: one row even for empty input.
        if self.groups.is_empty() && self.node.group_by.is_empty() {
            self.groups
                .push(GroupState::new(GroupKey::empty(), &self.node.aggregates));
        }
        self.flush()?;

        let emitted = self.emitter.as_ref().map_or(0, AggregateEmitter::emitted);
        tracing::debug!(
            strategy = self.strategy_label(),
            groups = emitted,
            "inline aggregate finished"
        );

        Ok(())
    }
}
