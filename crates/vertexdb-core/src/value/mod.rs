mod compare;
mod tag;

#[cfg(test)]
mod tests;

use std::fmt;

// re-exports
pub use compare::strict_order_cmp;
pub use tag::ValueTag;

///
/// Value
///
/// Typed scalar stored in tuple columns and produced by expressions.
///
/// Null → SQL NULL; never equal to anything under predicate semantics.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Float64(f64),
    Int(i64),
    Null,
    Text(String),
}

impl Value {
    ///
    /// TYPES
    ///

    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        match self {
            Self::Bool(_) => ValueTag::Bool,
            Self::Float64(_) => ValueTag::Float64,
            Self::Int(_) => ValueTag::Int,
            Self::Null => ValueTag::Null,
            Self::Text(_) => ValueTag::Text,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float64(_))
    }

    /// Predicate truthiness: only `Bool(true)` passes a filter.
    #[must_use]
    pub const fn is_true(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    ///
    /// CONVERSION
    ///

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub const fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    ///
    /// ARITHMETIC
    ///

    /// Add two numeric values, widening to Float64 when the operands mix.
    ///
    /// Returns `None` for non-numeric operands or integer overflow.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.checked_add(*b).map(Self::Int),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                Some(Self::Float64(a.to_f64()? + b.to_f64()?))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Null => write!(f, "NULL"),
            Self::Text(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}
