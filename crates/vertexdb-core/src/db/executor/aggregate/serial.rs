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
use std::rc::Rc;

///
/// SerialAggregate
///
/// Input arrives grouped on the group-by keys, so at most one group is
/// open at a time and it is emitted as soon as the key changes.
///

pub struct SerialAggregate<'a> {
    node: &'a AggregateNode,
    lifecycle: Lifecycle,
    emitter: Option<AggregateEmitter<'a>>,
    current: Option<GroupState>,
}

impl<'a> SerialAggregate<'a> {
    #[must_use]
    pub const fn new(node: &'a AggregateNode) -> Self {
        Self {
            node,
            lifecycle: Lifecycle::Created,
            emitter: None,
            current: None,
        }
    }

    fn emitter(&mut self) -> Result<&mut AggregateEmitter<'a>, InternalError> {
        self.emitter
            .as_mut()
            .ok_or_else(|| InternalError::aggregate_invariant("serial aggregate has no emitter"))
    }
}

impl InlineAggregate for SerialAggregate<'_> {
    fn init(
        &mut self,
        params: &[Value],
        progress: &ProgressMonitorProxy,
        input_schema: Rc<TupleSchema>,
        output: TableHandle,
    ) -> Result<Tuple, InternalError> {
        if self.lifecycle == Lifecycle::Running {
            tracing::debug!(
                strategy = "serial",
                pending = self.current.is_some(),
                "discarding unfinished inline aggregate run"
            );
        }
        self.current = None;
        self.emitter = Some(AggregateEmitter::new(self.node, params, progress, output)?);
        self.lifecycle = Lifecycle::Running;

        Ok(Tuple::nulls(input_schema.column_count()))
    }

    fn feed(&mut self, tuple: &Tuple) -> Result<FoldControl, InternalError> {
        self.lifecycle.check_running("feed")?;
        let key = GroupKey::evaluate(&self.node.group_by, tuple)?;

        let mut control = FoldControl::Continue;
        if self.current.as_ref().is_some_and(|group| *group.key() != key)
            && let Some(done) = self.current.take()
        {
            control = self.emitter()?.emit(done)?;
        }
        if control == FoldControl::Break {
            return Ok(control);
        }

        let aggregates = &self.node.aggregates;
        let group = self
            .current
            .get_or_insert_with(|| GroupState::new(key, aggregates));
        group.update(aggregates, tuple)?;

        Ok(FoldControl::Continue)
    }

    fn finish(&mut self) -> Result<(), InternalError> {
        self.lifecycle.check_running("finish")?;
        self.lifecycle = Lifecycle::Finished;

        let pending = match self.current.take() {
            Some(group) => Some(group),
            // No group-by: one row even for empty input.
            None if self.node.group_by.is_empty() => {
                Some(GroupState::new(GroupKey::empty(), &self.node.aggregates))
            }
            None => None,
        };
        if let Some(group) = pending {
            self.emitter()?.emit(group)?;
        }

        let emitted = self.emitter()?.emitted();
        tracing::debug!(strategy = "serial", groups = emitted, "inline aggregate finished");

        Ok(())
    }
}
