//! Graph view: vertex and edge tables plus per-vertex degree metadata.

use crate::{
    db::{
        schema::TupleSchema,
        table::{Table, TableHandle},
        tuple::Tuple,
    },
    error::InternalError,
};
use derive_more::{Display, From};
use std::{collections::HashMap, rc::Rc};

///
/// VertexId
///

#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd)]
pub struct VertexId(pub i64);

///
/// EdgeId
///

#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgeId(pub i64);

///
/// Vertex
///
/// Degree metadata for one vertex. `fan_out` counts edges leaving the
/// vertex, `fan_in` counts edges arriving at it.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub fan_out: u32,
    pub fan_in: u32,
}

///
/// Edge
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: VertexId,
    pub to: VertexId,
}

///
/// GraphView
///
/// Owns a graph's vertex table (column 0 = vertex id) and edge table
/// (columns 0..3 = edge id, from-vertex, to-vertex). Scan operators read
/// degree metadata from the view and never mutate it.
///

#[derive(Debug)]
pub struct GraphView {
    name: String,
    vertex_table: TableHandle,
    edge_table: TableHandle,
    vertices: HashMap<VertexId, Vertex>,
    edges: HashMap<EdgeId, Edge>,
}

impl GraphView {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        vertex_schema: Rc<TupleSchema>,
        edge_schema: Rc<TupleSchema>,
    ) -> Self {
        let name = name.into();
        let vertex_table = Table::new(format!("{name}_vertexes"), vertex_schema);
        let edge_table = Table::new(format!("{name}_edges"), edge_schema);

        Self {
            name,
            vertex_table: TableHandle::new(vertex_table),
            edge_table: TableHandle::new(edge_table),
            vertices: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert one vertex row; its id is read from column 0.
    pub fn add_vertex(&mut self, row: Tuple) -> Result<VertexId, InternalError> {
        let id = VertexId(id_column(&row, 0, "vertex")?);
        if self.vertices.contains_key(&id) {
            return Err(InternalError::graph_invariant(format!(
                "graph '{}' already contains vertex {id}",
                self.name
            )));
        }

        self.vertex_table.try_borrow_mut()?.insert_temp_tuple(&row)?;
        self.vertices.insert(
            id,
            Vertex {
                id,
                fan_out: 0,
                fan_in: 0,
            },
        );

        Ok(id)
    }

    /// Insert one edge row and update the degree of both endpoints.
    pub fn add_edge(&mut self, row: Tuple) -> Result<EdgeId, InternalError> {
        let id = EdgeId(id_column(&row, 0, "edge")?);
        let from = VertexId(id_column(&row, 1, "edge source")?);
        let to = VertexId(id_column(&row, 2, "edge target")?);

        if self.edges.contains_key(&id) {
            return Err(InternalError::graph_invariant(format!(
                "graph '{}' already contains edge {id}",
                self.name
            )));
        }
        for endpoint in [from, to] {
            if !self.vertices.contains_key(&endpoint) {
                return Err(InternalError::graph_not_found(format!(
                    "edge {id} references unknown vertex {endpoint} in graph '{}'",
                    self.name
                )));
            }
        }

        self.edge_table.try_borrow_mut()?.insert_temp_tuple(&row)?;
        if let Some(vertex) = self.vertices.get_mut(&from) {
            vertex.fan_out = vertex.fan_out.saturating_add(1);
        }
        if let Some(vertex) = self.vertices.get_mut(&to) {
            vertex.fan_in = vertex.fan_in.saturating_add(1);
        }
        self.edges.insert(id, Edge { id, from, to });

        Ok(id)
    }

    #[must_use]
    pub fn vertex_table(&self) -> TableHandle {
        self.vertex_table.clone()
    }

    #[must_use]
    pub fn edge_table(&self) -> TableHandle {
        self.edge_table.clone()
    }

    #[must_use]
    pub fn get_vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    #[must_use]
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// Read one integer id column out of a vertex or edge row.
fn id_column(row: &Tuple, index: usize, what: &str) -> Result<i64, InternalError> {
    row.value(index).and_then(crate::value::Value::as_int).ok_or_else(|| {
        InternalError::graph_invariant(format!(
            "{what} id in column {index} must be an integer, got {:?}",
            row.value(index)
        ))
    })
}
