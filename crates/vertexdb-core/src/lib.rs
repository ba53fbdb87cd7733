//! Core runtime for VertexDB: graph tables, scan plans, and the vertex scan
//! executor with its inline projection and aggregation stages.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod obs;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{ColumnType, GraphView, Tuple, TupleSchema, VertexId},
        value::Value,
    };
}
