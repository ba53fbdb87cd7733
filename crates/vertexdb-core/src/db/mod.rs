//! Graph storage, plans and the executors that run them.

pub mod executor;
pub mod expr;
pub mod graph;
pub mod plan;
pub mod schema;
pub mod table;
pub mod tuple;

// re-exports
pub use executor::{
    ClusterNodeId, CountingPostfilter, ExecutionContext, LocalAttributeFetcher, OutputTable,
    ProgressMonitorProxy, ProgressReporter, RemoteAttributeFetcher, ScanOutcome, ScanReport,
    SiteId, VertexScanExecutor,
};
pub use expr::{ArithOp, CompareOp, Expr, Expression};
pub use graph::{Edge, EdgeId, GraphView, Vertex, VertexId};
pub use plan::{
    AggregateExpr, AggregateKind, AggregateNode, AggregateStrategy, InlineNodes, LimitNode,
    LimitValue, PlanNode, ProjectionNode, VertexScanNode,
};
pub use schema::{ColumnDef, ColumnType, TupleSchema};
pub use table::{ConsumingIter, Table, TableHandle};
pub use tuple::Tuple;
