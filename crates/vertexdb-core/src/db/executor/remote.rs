//! Attribute fetch from other cluster nodes, and the diagnostic probe that
//! exercises it before a vertex scan.

use crate::{
    config::RemoteProbeConfig,
    db::{
        executor::context::ExecutionContext,
        graph::{EdgeId, GraphView, VertexId},
        schema::{ColumnDef, TupleSchema},
        table::Table,
        tuple::Tuple,
    },
    error::InternalError,
    obs::sink::{MetricsEvent, record},
    value::Value,
};
use derive_more::Display;
use std::rc::Rc;

///
/// ClusterNodeId
///
/// Destination identity of one host's partition: the host id sits in the
/// low 32 bits above a fixed site marker in bit 32.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub struct ClusterNodeId(pub u64);

impl ClusterNodeId {
    const SITE_MARKER: u64 = 1 << 32;

    #[must_use]
    pub fn for_host(host_id: u32) -> Self {
        Self(Self::SITE_MARKER + u64::from(host_id))
    }

    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn host_id(self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }
}

///
/// RemoteAttributeFetcher
///
/// Fetches vertex or edge attributes held by another cluster node.
/// An empty attribute list requests every column.
///

pub trait RemoteAttributeFetcher {
    fn vertex_attributes(
        &self,
        destination: ClusterNodeId,
        ids: &[VertexId],
        attributes: &[String],
        graph: &GraphView,
    ) -> Result<Table, InternalError>;

    fn edge_attributes(
        &self,
        destination: ClusterNodeId,
        ids: &[EdgeId],
        attributes: &[String],
        graph: &GraphView,
    ) -> Result<Table, InternalError>;
}

///
/// LocalAttributeFetcher
///
/// Loopback fetcher that answers from the graph view it is handed.
/// Used by single-host deployments and tests.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct LocalAttributeFetcher;

impl RemoteAttributeFetcher for LocalAttributeFetcher {
    fn vertex_attributes(
        &self,
        _destination: ClusterNodeId,
        ids: &[VertexId],
        attributes: &[String],
        graph: &GraphView,
    ) -> Result<Table, InternalError> {
        let ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
        let source = graph.vertex_table();
        let source = source.try_borrow()?;

        fetch_rows(&source, &ids, attributes, "vertex")
    }

    fn edge_attributes(
        &self,
        _destination: ClusterNodeId,
        ids: &[EdgeId],
        attributes: &[String],
        graph: &GraphView,
    ) -> Result<Table, InternalError> {
        let ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
        let source = graph.edge_table();
        let source = source.try_borrow()?;

        fetch_rows(&source, &ids, attributes, "edge")
    }
}

// Project the requested attributes of the rows whose column 0 is in `ids`.
fn fetch_rows(
    source: &Table,
    ids: &[i64],
    attributes: &[String],
    what: &str,
) -> Result<Table, InternalError> {
    let columns: Vec<usize> = if attributes.is_empty() {
        (0..source.schema().column_count()).collect()
    } else {
        attributes
            .iter()
            .map(|name| {
                source.schema().index_of(name).ok_or_else(|| {
                    InternalError::remote_not_found(format!(
                        "{what} attribute '{name}' not found in '{}'",
                        source.name()
                    ))
                })
            })
            .collect::<Result<_, _>>()?
    };

    let schema: Vec<ColumnDef> = columns
        .iter()
        .filter_map(|index| source.schema().column(*index).cloned())
        .collect();
    let mut out = Table::new(
        format!("{}_fetched", source.name()),
        Rc::new(TupleSchema::new(schema)),
    );

    for row in source.rows() {
        let Some(id) = row.value(0).and_then(Value::as_int) else {
            continue;
        };
        if !ids.contains(&id) {
            continue;
        }
        let projected: Vec<_> = columns
            .iter()
            .map(|index| row.value(*index).cloned().unwrap_or(Value::Null))
            .collect();
        out.insert_temp_tuple(&Tuple::new(projected))?;
    }

    Ok(out)
}

///
/// ProbeOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProbeOutcome {
    /// Probe disabled, wrong site, or no fetcher bound.
    Skipped,
    Fetched,
    Failed,
}

/// Diagnostic attribute fetch issued by the coordinator site.
///
/// Runs only when enabled in config, on the configured coordinator site,
/// with a fetcher bound. Failures are logged and counted, never returned.
pub(crate) fn run_remote_probe(ctx: &ExecutionContext, graph: &GraphView) -> ProbeOutcome {
    let config = &ctx.config().remote_probe;
    if !config.enabled || ctx.site_id().0 != config.coordinator_site {
        return ProbeOutcome::Skipped;
    }
    let Some(fetcher) = ctx.remote_fetcher() else {
        return ProbeOutcome::Skipped;
    };

    let destination = ClusterNodeId::for_host(config.destination_host);
    let (vertex_ids, edge_ids) = probe_ids(config);

    let vertices =
        fetcher.vertex_attributes(destination, &vertex_ids, &config.vertex_attributes, graph);
    let edges = fetcher.edge_attributes(destination, &edge_ids, &config.edge_attributes, graph);

    let mut succeeded = true;
    for (what, result) in [("vertex", vertices), ("edge", edges)] {
        match result {
            Ok(table) => {
                tracing::debug!(
                    %destination,
                    kind = what,
                    rows = table.active_tuple_count(),
                    "remote attribute fetch\n{table}"
                );
            }
            Err(err) => {
                succeeded = false;
                tracing::warn!(
                    %destination,
                    kind = what,
                    error = %err.display_with_class(),
                    "remote attribute fetch failed"
                );
            }
        }
    }
    record(MetricsEvent::RemoteProbe { succeeded });

    if succeeded {
        ProbeOutcome::Fetched
    } else {
        ProbeOutcome::Failed
    }
}

// Vertex ids 0, 2, 4, … and edge ids 0, 1, 2, …
fn probe_ids(config: &RemoteProbeConfig) -> (Vec<VertexId>, Vec<EdgeId>) {
    let count = i64::try_from(config.probe_count).unwrap_or(i64::MAX);
    let vertex_ids = (0..count).map(|i| VertexId(i * 2)).collect();
    let edge_ids = (0..count).map(EdgeId).collect();

    (vertex_ids, edge_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ExecutorConfig,
        db::{executor::context::SiteId, schema::ColumnType},
        error::ErrorClass,
        obs::sink::{MetricsSink, with_metrics_sink},
        tuple,
    };
    use std::cell::Cell;

    fn graph() -> GraphView {
        let vertex_schema = Rc::new(TupleSchema::from_pairs(&[
            ("id", ColumnType::Int),
            ("name", ColumnType::Text),
        ]));
        let edge_schema = Rc::new(TupleSchema::from_pairs(&[
            ("id", ColumnType::Int),
            ("from_id", ColumnType::Int),
            ("to_id", ColumnType::Int),
            ("weight", ColumnType::Float64),
        ]));
        let mut g = GraphView::new("campus", vertex_schema, edge_schema);
        for (id, name) in [(0_i64, "a"), (1, "b"), (2, "c"), (4, "d")] {
            g.add_vertex(tuple![id, name]).expect("vertex");
        }
        g.add_edge(tuple![0_i64, 0_i64, 2_i64, 0.5_f64]).expect("edge");
        g.add_edge(tuple![1_i64, 2_i64, 4_i64, 1.5_f64]).expect("edge");

        g
    }

    fn probe_config() -> ExecutorConfig {
        let mut config = ExecutorConfig::default();
        config.remote_probe.enabled = true;
        config
    }

    #[derive(Default)]
    struct ProbeSink {
        failures: Cell<u32>,
    }

    impl MetricsSink for ProbeSink {
        fn record(&self, event: MetricsEvent<'_>) {
            if event == (MetricsEvent::RemoteProbe { succeeded: false }) {
                self.failures.set(self.failures.get() + 1);
            }
        }
    }

    #[test]
    fn cluster_node_id_encodes_host() {
        let id = ClusterNodeId::for_host(1);

        assert_eq!(id.0, 4_294_967_297);
        assert_eq!(id.host_id(), 1);
    }

    #[test]
    fn local_fetcher_projects_named_attributes() {
        let g = graph();
        let table = LocalAttributeFetcher
            .vertex_attributes(
                ClusterNodeId::for_host(1),
                &[VertexId(0), VertexId(2), VertexId(4)],
                &["name".to_string()],
                &g,
            )
            .expect("fetch");

        let names: Vec<_> = table.rows().map(|row| row.value(0).cloned()).collect();
        assert_eq!(
            names,
            vec![
                Some(Value::from("a")),
                Some(Value::from("c")),
                Some(Value::from("d"))
            ]
        );
    }

    #[test]
    fn local_fetcher_rejects_unknown_attribute() {
        let err = LocalAttributeFetcher
            .edge_attributes(
                ClusterNodeId::for_host(1),
                &[EdgeId(0)],
                &["colour".to_string()],
                &graph(),
            )
            .expect_err("unknown attribute");

        assert_eq!(err.class, ErrorClass::NotFound);
    }

    #[test]
    fn probe_is_skipped_unless_enabled_on_the_coordinator() {
        let g = graph();
        let fetcher: Rc<dyn RemoteAttributeFetcher> = Rc::new(LocalAttributeFetcher);

        let disabled = ExecutionContext::new(SiteId(0), ExecutorConfig::default())
            .with_remote_fetcher(fetcher.clone());
        assert_eq!(run_remote_probe(&disabled, &g), ProbeOutcome::Skipped);

        let other_site =
            ExecutionContext::new(SiteId(5), probe_config()).with_remote_fetcher(fetcher.clone());
        assert_eq!(run_remote_probe(&other_site, &g), ProbeOutcome::Skipped);

        let no_fetcher = ExecutionContext::new(SiteId(0), probe_config());
        assert_eq!(run_remote_probe(&no_fetcher, &g), ProbeOutcome::Skipped);

        let coordinator =
            ExecutionContext::new(SiteId(0), probe_config()).with_remote_fetcher(fetcher);
        assert_eq!(run_remote_probe(&coordinator, &g), ProbeOutcome::Fetched);
    }

    #[test]
    fn probe_failure_is_reported_not_returned() {
        let g = graph();
        let mut config = probe_config();
        config.remote_probe.edge_attributes = vec!["missing".to_string()];
        let ctx = ExecutionContext::new(SiteId(0), config)
            .with_remote_fetcher(Rc::new(LocalAttributeFetcher));
        let sink = ProbeSink::default();

        let outcome = with_metrics_sink(&sink, || run_remote_probe(&ctx, &g));

        assert_eq!(outcome, ProbeOutcome::Failed);
        assert_eq!(sink.failures.get(), 1);
    }
}
