//! Module: executor::vertex_scan
//! Responsibility: scan a graph's vertex table (or a subquery's output)
//! through the counting postfilter, with inline projection and aggregation.
//! Does not own: predicate semantics, aggregate state, table storage.

#[cfg(test)]
mod tests;

use crate::{
    db::{
        executor::{
            aggregate::{FoldControl, InlineAggregate, inline_aggregate_executor},
            context::ExecutionContext,
            output::OutputTable,
            postfilter::CountingPostfilter,
            remote::run_remote_probe,
        },
        expr::Expression,
        graph::{GraphView, VertexId},
        plan::{PlanNode, ProjectionNode, VertexScanNode},
        table::{Table, TableHandle},
        tuple::Tuple,
    },
    error::{InternalError, PlanDefect},
    obs::sink::{MetricsEvent, ScanSpan, ShortCircuit, record},
    value::Value,
};

///
/// ScanOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScanOutcome {
    /// Plan proved the scan empty; nothing was touched.
    Empty,
    /// Output aliases the source; no row-level work was done.
    PassThrough,
    /// Rows were pulled through the postfilter.
    Scanned,
}

///
/// ScanReport
///
/// Per-execution counters. `rows_emitted` counts rows that passed the
/// postfilter, whether they were inserted or fed to an inline aggregate.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    pub rows_scanned: u64,
    pub rows_emitted: u64,
}

impl ScanReport {
    const fn short_circuit(outcome: ScanOutcome) -> Self {
        Self {
            outcome,
            rows_scanned: 0,
            rows_emitted: 0,
        }
    }
}

///
/// VertexScanExecutor
///
/// Output routing is decided once in `init`: with no predicate and no
/// inline stage the output aliases the source table, otherwise the scan
/// owns a fresh table shaped to the plan's output schema.
///
/// The row source is drained by every general-path execution.
///

pub struct VertexScanExecutor<'n> {
    node: &'n VertexScanNode,
    label: String,
    source: TableHandle,
    output: OutputTable,
    aggregate: Option<Box<dyn InlineAggregate + 'n>>,
}

impl<'n> VertexScanExecutor<'n> {
    /// Validate the plan node and bind the output table.
    pub fn init(plan: &'n PlanNode) -> Result<Self, InternalError> {
        let node = match plan {
            PlanNode::VertexScan(node) => node,
            PlanNode::Projection(_) | PlanNode::Limit(_) | PlanNode::Aggregate(_) => {
                return Err(InternalError::plan_defect(
                    "VertexScan",
                    PlanDefect::WrongNodeShape {
                        found: plan.kind_name(),
                    },
                ));
            }
        };
        let label = node.label();

        let source = if node.subquery {
            match node.children.as_slice() {
                [child] => child.clone(),
                children => {
                    return Err(InternalError::plan_defect(
                        &label,
                        PlanDefect::SubqueryChildCount {
                            found: children.len(),
                        },
                    ));
                }
            }
        } else {
            node.target_graph
                .as_ref()
                .map(|graph| graph.vertex_table())
                .ok_or_else(|| InternalError::plan_defect(&label, PlanDefect::MissingGraphView))?
        };

        if let Some(projection) = &node.inline.projection {
            let expected = projection.exprs.len() + ProjectionNode::DEGREE_COLUMNS;
            if projection.column_count() != expected {
                return Err(InternalError::plan_defect(
                    &label,
                    PlanDefect::ProjectionWidth {
                        expressions: projection.exprs.len(),
                        columns: projection.column_count(),
                    },
                ));
            }
            if node.target_graph.is_none() {
                return Err(InternalError::plan_defect(
                    &label,
                    PlanDefect::MissingDegreeSource,
                ));
            }
        }

        let output = if is_pass_through(node) {
            OutputTable::Aliased(source.clone())
        } else {
            let name = source.try_borrow()?.name().to_string();
            OutputTable::Owned(TableHandle::new(Table::new(
                name,
                node.output_schema.clone(),
            )))
        };
        let aggregate = node
            .inline
            .aggregate
            .as_ref()
            .map(inline_aggregate_executor);

        tracing::debug!(
            operator = %label,
            subquery = node.subquery,
            pass_through = output.is_aliased(),
            inline_aggregate = aggregate.is_some(),
            "vertex scan initialized"
        );

        Ok(Self {
            node,
            label,
            source,
            output,
            aggregate,
        })
    }

    #[must_use]
    pub const fn output_table(&self) -> &OutputTable {
        &self.output
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run one execution of the scan.
    pub fn execute(
        &mut self,
        ctx: &ExecutionContext,
        params: &[Value],
    ) -> Result<ScanReport, InternalError> {
        let node = self.node;
        let source_name = match &node.target_graph {
            Some(graph) => graph.name().to_string(),
            None => self.source.try_borrow()?.name().to_string(),
        };

        if node.empty_scan {
            tracing::debug!(operator = %self.label, "empty scan short-circuit");
            record(MetricsEvent::ScanShortCircuit {
                source: &source_name,
                reason: ShortCircuit::EmptyScan,
            });
            return Ok(ScanReport::short_circuit(ScanOutcome::Empty));
        }

        let mut span = ScanSpan::new(&source_name);

        if let Some(graph) = &node.target_graph {
            run_remote_probe(ctx, graph);
        }

        if is_pass_through(node) {
            tracing::debug!(operator = %self.label, "pass-through scan, output aliases source");
            record(MetricsEvent::ScanShortCircuit {
                source: &source_name,
                reason: ShortCircuit::PassThrough,
            });
            return Ok(ScanReport::short_circuit(ScanOutcome::PassThrough));
        }

        let (limit, offset) = match &node.inline.limit {
            Some(limit) => limit.resolve(params)?,
            None => (
                CountingPostfilter::NO_LIMIT,
                CountingPostfilter::NO_OFFSET,
            ),
        };
        let predicate = node.predicate.as_ref().map(|p| p as &dyn Expression);
        if let Some(predicate) = predicate {
            tracing::trace!(operator = %self.label, ?predicate, "scan predicate");
        }
        let mut postfilter = CountingPostfilter::new(predicate, limit, offset);

        let progress = ctx.progress_proxy(node.id);
        let projection = node.inline.projection.as_ref();
        let output = self.output.owned()?.clone();

        let mut scratch = match self.aggregate.as_mut() {
            Some(aggregate) => {
                let input_schema = match projection {
                    Some(projection) => projection.output_schema.clone(),
                    None => self.source.try_borrow()?.schema().clone(),
                };
                aggregate.init(params, &progress, input_schema, output.clone())?
            }
            None => output.try_borrow()?.temp_tuple(),
        };
        let degree_source = match projection {
            Some(projection) => Some(self.projection_target(projection, &scratch)?),
            None => None,
        };

        let mut rows_scanned: u64 = 0;
        {
            let source = self.source.clone();
            let mut table = source.try_borrow_mut()?;
            let mut rows = table.iter_consuming();

            while postfilter.is_under_limit()
                && let Some(tuple) = rows.next()
            {
                rows_scanned += 1;
                // consumed rows stay counted if this row fails
                span.set_rows(rows_scanned, emitted_rows(&postfilter));
                progress.countdown_progress();
                tracing::trace!(operator = %self.label, %tuple, "input tuple");

                if !postfilter.eval(&tuple)? {
                    continue;
                }

                let routed = match (projection, degree_source) {
                    (Some(projection), Some(graph)) => {
                        project(projection, graph, &tuple, &mut scratch)?;
                        &scratch
                    }
                    _ => &tuple,
                };
                if output_tuple(self.aggregate.as_deref_mut(), &output, routed)?
                    == FoldControl::Break
                {
                    postfilter.set_above_limit();
                }

                progress.countdown_progress();
            }
        }

        if let Some(aggregate) = self.aggregate.as_mut() {
            aggregate.finish()?;
        }

        let rows_emitted = emitted_rows(&postfilter);
        span.set_rows(rows_scanned, rows_emitted);

        tracing::debug!(
            operator = %self.label,
            rows_scanned,
            rows_emitted,
            "vertex scan finished"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let table = output.try_borrow()?;
            tracing::trace!(operator = %self.label, "output table\n{table}");
        }

        Ok(ScanReport {
            outcome: ScanOutcome::Scanned,
            rows_scanned,
            rows_emitted,
        })
    }

    // Graph used for degree lookups, after checking the scratch tuple can
    // hold every projected column.
    fn projection_target(
        &self,
        projection: &ProjectionNode,
        scratch: &Tuple,
    ) -> Result<&'n GraphView, InternalError> {
        if scratch.len() != projection.column_count() {
            return Err(InternalError::executor_invariant(format!(
                "{}: scratch tuple has {} columns, projection writes {}",
                self.label,
                scratch.len(),
                projection.column_count()
            )));
        }

        self.node.target_graph.as_deref().ok_or_else(|| {
            InternalError::plan_defect(&self.label, PlanDefect::MissingDegreeSource)
        })
    }
}

const fn is_pass_through(node: &VertexScanNode) -> bool {
    node.predicate.is_none() && node.inline.is_empty()
}

fn emitted_rows(postfilter: &CountingPostfilter<'_>) -> u64 {
    u64::try_from(postfilter.emitted()).unwrap_or(u64::MAX)
}

// Evaluate the projection into `scratch`; the trailing two columns carry
// the vertex's out-degree and in-degree.
fn project(
    projection: &ProjectionNode,
    graph: &GraphView,
    input: &Tuple,
    scratch: &mut Tuple,
) -> Result<(), InternalError> {
    let vertex_id = match input.value(0) {
        Some(Value::Int(id)) => VertexId(*id),
        other => {
            return Err(InternalError::graph_invariant(format!(
                "vertex id column of graph '{}' must be an integer, got {}",
                graph.name(),
                other.map_or("nothing", |v| v.tag().label())
            )));
        }
    };
    let vertex = graph.get_vertex(vertex_id).ok_or_else(|| {
        InternalError::graph_invariant(format!(
            "vertex {vertex_id} is not present in graph '{}'",
            graph.name()
        ))
    })?;

    for (index, expr) in projection.exprs.iter().enumerate() {
        scratch.set_value(index, expr.eval(input)?)?;
    }
    let degrees = projection.exprs.len();
    scratch.set_value(degrees, Value::from(vertex.fan_out))?;
    scratch.set_value(degrees + 1, Value::from(vertex.fan_in))?;

    Ok(())
}

// Deliver one qualifying row: to the inline aggregate when bound,
// otherwise as a new row of the owned output table.
fn output_tuple(
    aggregate: Option<&mut (dyn InlineAggregate + '_)>,
    output: &TableHandle,
    tuple: &Tuple,
) -> Result<FoldControl, InternalError> {
    match aggregate {
        Some(aggregate) => aggregate.feed(tuple),
        None => {
            output.try_borrow_mut()?.insert_temp_tuple(tuple)?;
            Ok(FoldControl::Continue)
        }
    }
}
