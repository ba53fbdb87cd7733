//! Expression trees evaluated against one tuple.
//!
//! Operators only depend on the [`Expression`] contract; [`Expr`] is the
//! tree form produced by the planner.

use crate::{
    db::tuple::Tuple,
    error::InternalError,
    value::{Value, strict_order_cmp},
};
use std::{cmp::Ordering, fmt};

///
/// Expression
///

pub trait Expression: fmt::Debug {
    /// Evaluate against one tuple.
    fn eval(&self, tuple: &Tuple) -> Result<Value, InternalError>;
}

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    const fn matches(self, ord: Ordering) -> bool {
        match self {
            Self::Eq => matches!(ord, Ordering::Equal),
            Self::Ne => !matches!(ord, Ordering::Equal),
            Self::Lt => matches!(ord, Ordering::Less),
            Self::Lte => !matches!(ord, Ordering::Greater),
            Self::Gt => matches!(ord, Ordering::Greater),
            Self::Gte => !matches!(ord, Ordering::Less),
        }
    }
}

///
/// ArithOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

///
/// Expr
///
/// Comparisons and arithmetic propagate Null; `And`/`Or` use three-valued
/// logic. Filters pass a tuple only when the result is `Bool(true)`.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Column(usize),
    Constant(Value),
    Compare {
        op: CompareOp,
        left: Box<Self>,
        right: Box<Self>,
    },
    Arith {
        op: ArithOp,
        left: Box<Self>,
        right: Box<Self>,
    },
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    IsNull(Box<Self>),
}

impl Expr {
    ///
    /// CONSTRUCTION
    ///

    #[must_use]
    pub const fn column(index: usize) -> Self {
        Self::Column(index)
    }

    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant(value.into())
    }

    #[must_use]
    pub fn compare(op: CompareOp, left: Self, right: Self) -> Self {
        Self::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn arith(op: ArithOp, left: Self, right: Self) -> Self {
        Self::Arith {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `column <op> constant`, the common predicate shape.
    #[must_use]
    pub fn column_cmp(index: usize, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::compare(op, Self::Column(index), Self::constant(value))
    }
}

impl Expression for Expr {
    fn eval(&self, tuple: &Tuple) -> Result<Value, InternalError> {
        match self {
            Self::Column(index) => tuple.value(*index).cloned().ok_or_else(|| {
                InternalError::executor_invariant(format!(
                    "column reference {index} out of range for tuple width {}",
                    tuple.len()
                ))
            }),
            Self::Constant(value) => Ok(value.clone()),
            Self::Compare { op, left, right } => {
                let left = left.eval(tuple)?;
                let right = right.eval(tuple)?;
                eval_compare(*op, &left, &right)
            }
            Self::Arith { op, left, right } => {
                let left = left.eval(tuple)?;
                let right = right.eval(tuple)?;
                eval_arith(*op, &left, &right)
            }
            Self::And(children) => {
                let mut saw_null = false;
                for child in children {
                    match child.eval(tuple)? {
                        Value::Bool(false) => return Ok(Value::Bool(false)),
                        Value::Bool(true) => {}
                        Value::Null => saw_null = true,
                        other => return Err(non_boolean("AND", &other)),
                    }
                }
                Ok(if saw_null {
                    Value::Null
                } else {
                    Value::Bool(true)
                })
            }
            Self::Or(children) => {
                let mut saw_null = false;
                for child in children {
                    match child.eval(tuple)? {
                        Value::Bool(true) => return Ok(Value::Bool(true)),
                        Value::Bool(false) => {}
                        Value::Null => saw_null = true,
                        other => return Err(non_boolean("OR", &other)),
                    }
                }
                Ok(if saw_null {
                    Value::Null
                } else {
                    Value::Bool(false)
                })
            }
            Self::Not(inner) => match inner.eval(tuple)? {
                Value::Bool(v) => Ok(Value::Bool(!v)),
                Value::Null => Ok(Value::Null),
                other => Err(non_boolean("NOT", &other)),
            },
            Self::IsNull(inner) => Ok(Value::Bool(inner.eval(tuple)?.is_null())),
        }
    }
}

fn eval_compare(op: CompareOp, left: &Value, right: &Value) -> Result<Value, InternalError> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    let ord = strict_order_cmp(left, right).ok_or_else(|| {
        InternalError::expression_unsupported(format!(
            "cannot compare {} with {}",
            left.tag().label(),
            right.tag().label()
        ))
    })?;

    Ok(Value::Bool(op.matches(ord)))
}

fn eval_arith(op: ArithOp, left: &Value, right: &Value) -> Result<Value, InternalError> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            let result = match op {
                ArithOp::Add => a.checked_add(*b),
                ArithOp::Sub => a.checked_sub(*b),
                ArithOp::Mul => a.checked_mul(*b),
                ArithOp::Div => {
                    if *b == 0 {
                        return Err(InternalError::expression_invalid(
                            "integer division by zero",
                        ));
                    }
                    a.checked_div(*b)
                }
            };
            result.map(Value::Int).ok_or_else(|| {
                InternalError::expression_invalid(format!("integer overflow in {a} {op:?} {b}"))
            })
        }
        _ => match (left.to_f64(), right.to_f64()) {
            (Some(a), Some(b)) => Ok(Value::Float64(match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::Div => a / b,
            })),
            _ => Err(InternalError::expression_unsupported(format!(
                "arithmetic {op:?} is not defined for {} and {}",
                left.tag().label(),
                right.tag().label()
            ))),
        },
    }
}

fn non_boolean(operator: &str, value: &Value) -> InternalError {
    InternalError::expression_unsupported(format!(
        "{operator} operand must be boolean, got {}",
        value.tag().label()
    ))
}
