//! Tuple storage used for vertex tables, edge tables and operator output.
//!
//! Tables are single-threaded: a query step shares them through
//! [`TableHandle`], and every borrow is checked so that two consuming scans
//! of the same table can never interleave.

use crate::{
    db::{schema::TupleSchema, tuple::Tuple},
    error::InternalError,
};
use std::{
    cell::{Ref, RefCell, RefMut},
    collections::VecDeque,
    fmt,
    rc::Rc,
};

///
/// Table
///

#[derive(Debug)]
pub struct Table {
    name: String,
    schema: Rc<TupleSchema>,
    rows: VecDeque<Tuple>,
    allocated: usize,
}

impl Table {
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Rc<TupleSchema>) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: VecDeque::new(),
            allocated: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn schema(&self) -> &Rc<TupleSchema> {
        &self.schema
    }

    /// Rows currently held by the table.
    #[must_use]
    pub fn active_tuple_count(&self) -> usize {
        self.rows.len()
    }

    /// High-water mark of rows ever held by the table.
    #[must_use]
    pub const fn allocated_tuple_count(&self) -> usize {
        self.allocated
    }

    /// Scratch tuple shaped to this table's schema, every column Null.
    #[must_use]
    pub fn temp_tuple(&self) -> Tuple {
        Tuple::nulls(self.schema.column_count())
    }

    /// Copy one tuple into the table as a new owned row.
    pub fn insert_temp_tuple(&mut self, tuple: &Tuple) -> Result<(), InternalError> {
        self.check_shape(tuple)?;
        self.rows.push_back(tuple.clone());
        self.allocated = self.allocated.max(self.rows.len());

        Ok(())
    }

    /// Read-only iteration in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &Tuple> {
        self.rows.iter()
    }

    /// Destructive forward iterator.
    ///
    /// Every yielded tuple is removed from the table. Rows that are never
    /// pulled stay in the table, so a pass that stops early leaves the tail
    /// behind; a second pass after a full one yields nothing.
    pub fn iter_consuming(&mut self) -> ConsumingIter<'_> {
        ConsumingIter {
            rows: &mut self.rows,
            consumed: 0,
        }
    }

    fn check_shape(&self, tuple: &Tuple) -> Result<(), InternalError> {
        if tuple.len() != self.schema.column_count() {
            return Err(InternalError::table_invariant(format!(
                "table '{}' expects {} columns, tuple has {}",
                self.name,
                self.schema.column_count(),
                tuple.len()
            )));
        }

        for (index, (value, column)) in tuple.iter().zip(self.schema.columns()).enumerate() {
            if !column.ty.accepts(value) {
                return Err(InternalError::table_invariant(format!(
                    "table '{}' column {index} ({}) is {}, got {}",
                    self.name,
                    column.name,
                    column.ty,
                    value.tag().label()
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Table {} ({}) active={} allocated={}",
            self.name,
            self.schema,
            self.rows.len(),
            self.allocated
        )?;
        for tuple in &self.rows {
            writeln!(f, "  {tuple}")?;
        }

        Ok(())
    }
}

///
/// ConsumingIter
///
/// Draining iterator returned by [`Table::iter_consuming`].
///

pub struct ConsumingIter<'a> {
    rows: &'a mut VecDeque<Tuple>,
    consumed: usize,
}

impl ConsumingIter<'_> {
    /// Number of tuples yielded (and removed) so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }
}

impl Iterator for ConsumingIter<'_> {
    type Item = Tuple;

    fn next(&mut self) -> Option<Tuple> {
        let tuple = self.rows.pop_front()?;
        self.consumed += 1;

        Some(tuple)
    }
}

///
/// TableHandle
///
/// Shared, borrow-checked reference to one table within a query step.
///

#[derive(Clone, Debug)]
pub struct TableHandle(Rc<RefCell<Table>>);

impl TableHandle {
    #[must_use]
    pub fn new(table: Table) -> Self {
        Self(Rc::new(RefCell::new(table)))
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, Table>, InternalError> {
        self.0.try_borrow().map_err(|_| {
            InternalError::table_invariant("table is exclusively borrowed by an active scan")
        })
    }

    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, Table>, InternalError> {
        self.0.try_borrow_mut().map_err(|_| {
            InternalError::table_invariant(
                "table is already borrowed; concurrent scans of one table are not supported",
            )
        })
    }

    /// Whether both handles refer to the same table.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
