use crate::{error::InternalError, value::Value};
use derive_more::Deref;
use std::fmt;

///
/// Tuple
///
/// Owned ordered row of values. Tuples yielded by a consuming table
/// iterator are moved out of the table; scratch tuples are owned by the
/// operator that requested them and reused across rows.
///

#[derive(Clone, Debug, Default, Deref, PartialEq)]
pub struct Tuple {
    values: Vec<Value>,
}

impl Tuple {
    #[must_use]
    pub const fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Build a tuple of `width` Null values.
    #[must_use]
    pub fn nulls(width: usize) -> Self {
        Self {
            values: vec![Value::Null; width],
        }
    }

    #[must_use]
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Overwrite one column of this tuple.
    pub fn set_value(&mut self, index: usize, value: Value) -> Result<(), InternalError> {
        let width = self.values.len();
        let slot = self.values.get_mut(index).ok_or_else(|| {
            InternalError::table_invariant(format!(
                "tuple column {index} out of range for width {width}"
            ))
        })?;
        *slot = value;

        Ok(())
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (index, value) in self.values.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

/// Build a tuple from a list of values convertible into [`Value`].
#[macro_export]
macro_rules! tuple {
    ($($value:expr),* $(,)?) => {
        $crate::db::Tuple::new(vec![$($crate::value::Value::from($value)),*])
    };
}
