use crate::value::Value;
use std::fmt;

///
/// ColumnType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColumnType {
    Bool,
    Float64,
    Int,
    Text,
}

impl ColumnType {
    /// Whether one value may be stored in a column of this type.
    /// Null is accepted by every column.
    #[must_use]
    pub const fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Self::Bool, Value::Bool(_))
                | (Self::Float64, Value::Float64(_))
                | (Self::Int, Value::Int(_))
                | (Self::Text, Value::Text(_))
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bool => "BOOLEAN",
            Self::Float64 => "FLOAT",
            Self::Int => "BIGINT",
            Self::Text => "VARCHAR",
        };
        write!(f, "{label}")
    }
}

///
/// ColumnDef
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
}

impl ColumnDef {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

///
/// TupleSchema
///
/// Ordered, fixed-width column layout shared by a table and its tuples.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TupleSchema {
    columns: Vec<ColumnDef>,
}

impl TupleSchema {
    #[must_use]
    pub const fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    /// Build a schema from `(name, type)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, ColumnType)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(name, ty)| ColumnDef::new(*name, *ty))
                .collect(),
        )
    }

    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, index: usize) -> Option<&ColumnDef> {
        self.columns.get(index)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for TupleSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, column) in self.columns.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", column.name, column.ty)?;
        }

        Ok(())
    }
}
