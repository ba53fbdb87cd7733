//! Plan nodes consumed by executors.
//!
//! Plans are built and validated by the planner; executors read them and
//! never mutate them.

use crate::{
    db::{expr::Expr, graph::GraphView, schema::TupleSchema, table::TableHandle},
    error::InternalError,
    value::Value,
};
use std::rc::Rc;

///
/// PlanNode
///
/// Closed set of plan node kinds. Executors match exhaustively and reject
/// kinds they cannot run.
///

#[derive(Clone, Debug)]
pub enum PlanNode {
    VertexScan(VertexScanNode),
    Projection(ProjectionNode),
    Limit(LimitNode),
    Aggregate(AggregateNode),
}

impl PlanNode {
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::VertexScan(_) => "VertexScan",
            Self::Projection(_) => "Projection",
            Self::Limit(_) => "Limit",
            Self::Aggregate(_) => "Aggregate",
        }
    }
}

///
/// VertexScanNode
///
/// Scan over a graph's vertex table, or over the single child's output when
/// `subquery` is set. `empty_scan` marks a scan the planner proved empty.
///

#[derive(Clone, Debug)]
pub struct VertexScanNode {
    pub id: u32,
    pub target_graph: Option<Rc<GraphView>>,
    pub children: Vec<TableHandle>,
    pub subquery: bool,
    pub empty_scan: bool,
    pub predicate: Option<Expr>,
    pub inline: InlineNodes,
    pub output_schema: Rc<TupleSchema>,
}

impl VertexScanNode {
    /// Plain scan of one graph's vertex table with no inline stages.
    #[must_use]
    pub fn over_graph(id: u32, graph: Rc<GraphView>, output_schema: Rc<TupleSchema>) -> Self {
        Self {
            id,
            target_graph: Some(graph),
            children: Vec::new(),
            subquery: false,
            empty_scan: false,
            predicate: None,
            inline: InlineNodes::default(),
            output_schema,
        }
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: Expr) -> Self {
        self.predicate = Some(predicate);
        self
    }

    #[must_use]
    pub fn with_projection(mut self, projection: ProjectionNode) -> Self {
        self.inline.projection = Some(projection);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: LimitNode) -> Self {
        self.inline.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_aggregate(mut self, aggregate: AggregateNode) -> Self {
        self.inline.aggregate = Some(aggregate);
        self
    }

    #[must_use]
    pub fn with_empty_scan(mut self) -> Self {
        self.empty_scan = true;
        self
    }

    /// Operator label used in diagnostics.
    #[must_use]
    pub fn label(&self) -> String {
        format!("VertexScan[{}]", self.id)
    }
}

///
/// InlineNodes
///
/// Stages fused into the scan so no intermediate table is materialized.
///

#[derive(Clone, Debug, Default)]
pub struct InlineNodes {
    pub projection: Option<ProjectionNode>,
    pub limit: Option<LimitNode>,
    pub aggregate: Option<AggregateNode>,
}

impl InlineNodes {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.projection.is_none() && self.limit.is_none() && self.aggregate.is_none()
    }
}

///
/// ProjectionNode
///
/// `exprs` fill the leading output columns; the trailing two columns of
/// `output_schema` carry the vertex's out-degree and in-degree.
///

#[derive(Clone, Debug)]
pub struct ProjectionNode {
    pub exprs: Vec<Expr>,
    pub output_schema: Rc<TupleSchema>,
}

impl ProjectionNode {
    /// Number of trailing degree columns appended to every projected row.
    pub const DEGREE_COLUMNS: usize = 2;

    #[must_use]
    pub const fn new(exprs: Vec<Expr>, output_schema: Rc<TupleSchema>) -> Self {
        Self {
            exprs,
            output_schema,
        }
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.output_schema.column_count()
    }
}

///
/// LimitValue
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LimitValue {
    Literal(u64),
    Param(usize),
}

impl LimitValue {
    fn resolve(self, params: &[Value], what: &str) -> Result<usize, InternalError> {
        let raw = match self {
            Self::Literal(v) => v,
            Self::Param(index) => match params.get(index) {
                Some(Value::Int(v)) => u64::try_from(*v).map_err(|_| {
                    InternalError::plan_invalid_parameter(format!(
                        "negative parameter {v} for {what}"
                    ))
                })?,
                Some(other) => {
                    return Err(InternalError::plan_invalid_parameter(format!(
                        "{what} parameter {index} must be an integer, got {}",
                        other.tag().label()
                    )));
                }
                None => {
                    return Err(InternalError::plan_invalid_parameter(format!(
                        "{what} parameter {index} is not bound"
                    )));
                }
            },
        };

        Ok(usize::try_from(raw).unwrap_or(usize::MAX))
    }
}

///
/// LimitNode
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LimitNode {
    pub limit: Option<LimitValue>,
    pub offset: Option<LimitValue>,
}

impl LimitNode {
    #[must_use]
    pub const fn literal(limit: Option<u64>, offset: u64) -> Self {
        Self {
            limit: match limit {
                Some(v) => Some(LimitValue::Literal(v)),
                None => None,
            },
            offset: Some(LimitValue::Literal(offset)),
        }
    }

    /// Resolve `(limit, offset)` against runtime parameters.
    /// An absent limit means unlimited; an absent offset means zero.
    pub fn resolve(&self, params: &[Value]) -> Result<(Option<usize>, usize), InternalError> {
        let limit = self
            .limit
            .map(|v| v.resolve(params, "LIMIT"))
            .transpose()?;
        let offset = self
            .offset
            .map(|v| v.resolve(params, "OFFSET"))
            .transpose()?
            .unwrap_or(0);

        Ok((limit, offset))
    }
}

///
/// AggregateStrategy
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AggregateStrategy {
    /// Input arrives grouped; a group is emitted as soon as its key changes.
    Serial,
    /// Input arrives ordered on the first `sorted_prefix` group-by keys.
    Partial { sorted_prefix: usize },
    /// Input order is arbitrary; groups are emitted at finish.
    Hash,
}

///
/// AggregateKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AggregateKind {
    Avg,
    Count,
    CountStar,
    Max,
    Min,
    Sum,
}

///
/// AggregateExpr
///

#[derive(Clone, Debug, PartialEq)]
pub struct AggregateExpr {
    pub kind: AggregateKind,
    /// Input expression; ignored by `CountStar`.
    pub input: Option<Expr>,
}

impl AggregateExpr {
    #[must_use]
    pub const fn count_star() -> Self {
        Self {
            kind: AggregateKind::CountStar,
            input: None,
        }
    }

    #[must_use]
    pub const fn new(kind: AggregateKind, input: Expr) -> Self {
        Self {
            kind,
            input: Some(input),
        }
    }
}

///
/// AggregateNode
///
/// Output rows are the group-by values followed by one column per
/// aggregate. `having` and `limit` apply to those output rows.
///

#[derive(Clone, Debug)]
pub struct AggregateNode {
    pub strategy: AggregateStrategy,
    pub group_by: Vec<Expr>,
    pub aggregates: Vec<AggregateExpr>,
    pub having: Option<Expr>,
    pub limit: Option<LimitNode>,
    pub output_schema: Rc<TupleSchema>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;

    #[test]
    fn limit_resolves_literals_and_params() {
        let node = LimitNode {
            limit: Some(LimitValue::Param(0)),
            offset: Some(LimitValue::Literal(2)),
        };

        assert_eq!(
            node.resolve(&[Value::Int(5)]).expect("resolve"),
            (Some(5), 2)
        );
        assert_eq!(
            LimitNode::default().resolve(&[]).expect("resolve"),
            (None, 0)
        );
    }

    #[test]
    fn negative_or_unbound_limit_params_are_invalid() {
        let node = LimitNode {
            limit: Some(LimitValue::Param(0)),
            offset: None,
        };

        let err = node.resolve(&[Value::Int(-1)]).expect_err("negative");
        assert_eq!(err.class, ErrorClass::InvalidParameter);
        assert!(!err.is_configuration_defect());

        let err = node.resolve(&[]).expect_err("unbound");
        assert!(err.message.contains("not bound"));

        let err = node.resolve(&[Value::from("3")]).expect_err("text");
        assert!(err.message.contains("must be an integer"));
    }
}
