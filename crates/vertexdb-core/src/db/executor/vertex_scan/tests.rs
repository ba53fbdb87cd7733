use super::*;
use crate::{
    config::ExecutorConfig,
    db::{
        executor::context::SiteId,
        expr::{CompareOp, Expr},
        plan::{InlineNodes, LimitNode},
        schema::{ColumnType, TupleSchema},
    },
    error::{ErrorClass, ErrorOrigin},
    tuple,
};
use std::rc::Rc;

fn vertex_schema() -> Rc<TupleSchema> {
    Rc::new(TupleSchema::from_pairs(&[
        ("id", ColumnType::Int),
        ("name", ColumnType::Text),
    ]))
}

fn graph() -> Rc<GraphView> {
    let edge_schema = Rc::new(TupleSchema::from_pairs(&[
        ("id", ColumnType::Int),
        ("from_id", ColumnType::Int),
        ("to_id", ColumnType::Int),
    ]));
    let mut g = GraphView::new("roads", vertex_schema(), edge_schema);
    for (id, name) in [(0_i64, "a"), (2, "b"), (4, "c")] {
        g.add_vertex(tuple![id, name]).expect("vertex");
    }
    g.add_edge(tuple![0_i64, 0_i64, 2_i64]).expect("edge");

    Rc::new(g)
}

fn init_err(plan: &PlanNode) -> InternalError {
    match VertexScanExecutor::init(plan) {
        Ok(_) => panic!("init should reject the plan"),
        Err(err) => err,
    }
}

fn ctx() -> ExecutionContext {
    ExecutionContext::new(SiteId(1), ExecutorConfig::default())
}

fn projection(exprs: Vec<Expr>, columns: &[(&str, ColumnType)]) -> ProjectionNode {
    ProjectionNode::new(exprs, Rc::new(TupleSchema::from_pairs(columns)))
}

fn subquery_node(children: Vec<TableHandle>) -> VertexScanNode {
    VertexScanNode {
        id: 9,
        target_graph: None,
        children,
        subquery: true,
        empty_scan: false,
        predicate: None,
        inline: InlineNodes::default(),
        output_schema: vertex_schema(),
    }
}

#[test]
fn non_scan_plan_is_a_wrong_node_shape() {
    let err = init_err(&PlanNode::Limit(LimitNode::default()));

    assert!(err.is_configuration_defect());
    assert_eq!(
        err.plan_defect_detail(),
        Some(&PlanDefect::WrongNodeShape { found: "Limit" })
    );
}

#[test]
fn base_scan_without_graph_is_rejected() {
    let mut node = VertexScanNode::over_graph(3, graph(), vertex_schema());
    node.target_graph = None;

    let err = init_err(&PlanNode::VertexScan(node));

    assert_eq!(err.plan_defect_detail(), Some(&PlanDefect::MissingGraphView));
    assert!(err.message.starts_with("VertexScan[3]: "));
}

#[test]
fn subquery_requires_exactly_one_child() {
    let child = || TableHandle::new(Table::new("child", vertex_schema()));

    for children in [Vec::new(), vec![child(), child()]] {
        let found = children.len();
        let err = init_err(&PlanNode::VertexScan(subquery_node(children)));

        assert_eq!(
            err.plan_defect_detail(),
            Some(&PlanDefect::SubqueryChildCount { found })
        );
    }
}

#[test]
fn projection_width_must_be_expressions_plus_degrees() {
    let node = VertexScanNode::over_graph(4, graph(), vertex_schema()).with_projection(projection(
        vec![Expr::column(0)],
        &[("id", ColumnType::Int), ("fan_out", ColumnType::Int)],
    ));

    let err = init_err(&PlanNode::VertexScan(node));

    assert_eq!(
        err.plan_defect_detail(),
        Some(&PlanDefect::ProjectionWidth {
            expressions: 1,
            columns: 2
        })
    );
}

#[test]
fn projection_over_subquery_needs_a_graph_for_degrees() {
    let child = TableHandle::new(Table::new("child", vertex_schema()));
    let mut node = subquery_node(vec![child]);
    node.inline.projection = Some(projection(
        Vec::new(),
        &[("fan_out", ColumnType::Int), ("fan_in", ColumnType::Int)],
    ));

    let err = init_err(&PlanNode::VertexScan(node));

    assert_eq!(
        err.plan_defect_detail(),
        Some(&PlanDefect::MissingDegreeSource)
    );
}

#[test]
fn output_routing_is_decided_at_init() {
    let g = graph();
    let plain = PlanNode::VertexScan(VertexScanNode::over_graph(1, g.clone(), vertex_schema()));
    let filtered = PlanNode::VertexScan(
        VertexScanNode::over_graph(2, g.clone(), vertex_schema())
            .with_predicate(Expr::column_cmp(0, CompareOp::Gt, 0_i64)),
    );

    let plain = VertexScanExecutor::init(&plain).expect("init");
    assert!(plain.output_table().is_aliased());
    assert!(plain.output_table().handle().ptr_eq(&g.vertex_table()));

    let filtered = VertexScanExecutor::init(&filtered).expect("init");
    let output = filtered.output_table().owned().expect("owned output");
    assert!(!output.ptr_eq(&g.vertex_table()));
    assert_eq!(output.try_borrow().expect("borrow").name(), "roads_vertexes");
    assert_eq!(filtered.label(), "VertexScan[2]");
}

#[test]
fn scratch_narrower_than_projection_is_an_executor_invariant() {
    let node = VertexScanNode::over_graph(5, graph(), vertex_schema()).with_projection(projection(
        vec![Expr::column(0)],
        &[
            ("id", ColumnType::Int),
            ("fan_out", ColumnType::Int),
            ("fan_in", ColumnType::Int),
        ],
    ));
    let plan = PlanNode::VertexScan(node);
    let mut exec = VertexScanExecutor::init(&plan).expect("init");

    let err = exec.execute(&ctx(), &[]).expect_err("scratch width");

    assert_eq!(err.origin, ErrorOrigin::Executor);
    assert!(err.is_configuration_defect());
}

#[test]
fn non_integer_vertex_id_is_a_graph_invariant() {
    let g = graph();
    let text_ids = Rc::new(TupleSchema::from_pairs(&[("id", ColumnType::Text)]));
    let mut child = Table::new("labels", text_ids);
    child.insert_temp_tuple(&tuple!["zero"]).expect("insert");

    let out = Rc::new(TupleSchema::from_pairs(&[
        ("fan_out", ColumnType::Int),
        ("fan_in", ColumnType::Int),
    ]));
    let mut node = subquery_node(vec![TableHandle::new(child)]);
    node.target_graph = Some(g);
    node.output_schema = out.clone();
    node.inline.projection = Some(ProjectionNode::new(Vec::new(), out));
    let plan = PlanNode::VertexScan(node);
    let mut exec = VertexScanExecutor::init(&plan).expect("init");

    let err = exec.execute(&ctx(), &[]).expect_err("text id");

    assert_eq!(err.origin, ErrorOrigin::Graph);
    assert_eq!(err.class, ErrorClass::InvariantViolation);
}

#[test]
fn unknown_vertex_under_projection_is_a_graph_invariant() {
    let g = graph();
    let mut child = Table::new("ids", vertex_schema());
    child.insert_temp_tuple(&tuple![99_i64, "ghost"]).expect("insert");

    let out = Rc::new(TupleSchema::from_pairs(&[
        ("fan_out", ColumnType::Int),
        ("fan_in", ColumnType::Int),
    ]));
    let mut node = subquery_node(vec![TableHandle::new(child)]);
    node.target_graph = Some(g);
    node.output_schema = out.clone();
    node.inline.projection = Some(ProjectionNode::new(Vec::new(), out));
    let plan = PlanNode::VertexScan(node);
    let mut exec = VertexScanExecutor::init(&plan).expect("init");

    let err = exec.execute(&ctx(), &[]).expect_err("ghost vertex");

    assert!(err.message.contains("vertex 99"));
    assert!(err.is_configuration_defect());
}

#[test]
fn concurrent_consuming_scan_is_rejected() {
    let g = graph();
    let plan = PlanNode::VertexScan(
        VertexScanNode::over_graph(6, g.clone(), vertex_schema())
            .with_predicate(Expr::column_cmp(0, CompareOp::Gte, 0_i64)),
    );
    let mut exec = VertexScanExecutor::init(&plan).expect("init");

    let vertex_table = g.vertex_table();
    let _other_scan = vertex_table.try_borrow_mut().expect("first borrow");
    let err = exec.execute(&ctx(), &[]).expect_err("second scan");

    assert_eq!(err.origin, ErrorOrigin::Table);
}
