use crate::value::Value;
use std::cmp::Ordering;

/// Strict comparator for orderable operand pairs.
///
/// Same-variant values compare directly; Int and Float64 compare
/// numerically. Returns `None` for Null operands, NaN, and mismatched
/// variants.
#[must_use]
pub fn strict_order_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
        (Value::Int(_), Value::Float64(b)) => left.to_f64()?.partial_cmp(b),
        (Value::Float64(a), Value::Int(_)) => a.partial_cmp(&right.to_f64()?),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
