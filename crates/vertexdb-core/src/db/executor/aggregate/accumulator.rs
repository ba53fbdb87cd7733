use crate::{
    db::plan::AggregateKind,
    error::InternalError,
    value::{Value, strict_order_cmp},
};
use std::cmp::Ordering;

///
/// Accumulator
///
/// Running state of one aggregate column within one group.
/// Nulls are skipped by every kind except `CountStar`.
///

#[derive(Clone, Debug, PartialEq)]
pub(super) enum Accumulator {
    Avg { sum: f64, count: u64 },
    Count(i64),
    CountStar(i64),
    Max(Option<Value>),
    Min(Option<Value>),
    Sum(Option<Value>),
}

impl Accumulator {
    #[must_use]
    pub(super) const fn for_kind(kind: AggregateKind) -> Self {
        match kind {
            AggregateKind::Avg => Self::Avg { sum: 0.0, count: 0 },
            AggregateKind::Count => Self::Count(0),
            AggregateKind::CountStar => Self::CountStar(0),
            AggregateKind::Max => Self::Max(None),
            AggregateKind::Min => Self::Min(None),
            AggregateKind::Sum => Self::Sum(None),
        }
    }

    /// Fold one input value. `CountStar` receives `None` and counts the row.
    pub(super) fn update(&mut self, value: Option<&Value>) -> Result<(), InternalError> {
        if let Self::CountStar(count) = self {
            *count = count.saturating_add(1);
            return Ok(());
        }

        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Ok(());
        };

        match self {
            Self::Avg { sum, count } => {
                let v = value.to_f64().ok_or_else(|| non_numeric("AVG", value))?;
                *sum += v;
                *count += 1;
            }
            Self::Count(count) => *count = count.saturating_add(1),
            Self::Max(current) => replace_if(current, value, Ordering::Greater, "MAX")?,
            Self::Min(current) => replace_if(current, value, Ordering::Less, "MIN")?,
            Self::Sum(current) => {
                let next = match current.as_ref() {
                    None if value.is_numeric() => value.clone(),
                    None => return Err(non_numeric("SUM", value)),
                    Some(acc) => acc.checked_add(value).ok_or_else(|| {
                        InternalError::aggregate_invalid(format!(
                            "SUM overflow or non-numeric input adding {value} to {acc}"
                        ))
                    })?,
                };
                *current = Some(next);
            }
            Self::CountStar(_) => {}
        }

        Ok(())
    }

    /// Final column value.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub(super) fn finalize(&self) -> Value {
        match self {
            Self::Avg { count: 0, .. } => Value::Null,
            Self::Avg { sum, count } => Value::Float64(sum / *count as f64),
            Self::Count(count) | Self::CountStar(count) => Value::Int(*count),
            Self::Max(value) | Self::Min(value) | Self::Sum(value) => {
                value.clone().unwrap_or(Value::Null)
            }
        }
    }
}

fn replace_if(
    current: &mut Option<Value>,
    candidate: &Value,
    wanted: Ordering,
    name: &str,
) -> Result<(), InternalError> {
    let replace = match current.as_ref() {
        None => true,
        Some(existing) => {
            let ord = strict_order_cmp(candidate, existing).ok_or_else(|| {
                InternalError::aggregate_unsupported(format!(
                    "{name} cannot compare {} with {}",
                    candidate.tag().label(),
                    existing.tag().label()
                ))
            })?;
            ord == wanted
        }
    };
    if replace {
        *current = Some(candidate.clone());
    }

    Ok(())
}

fn non_numeric(name: &str, value: &Value) -> InternalError {
    InternalError::aggregate_unsupported(format!(
        "{name} requires a numeric input, got {}",
        value.tag().label()
    ))
}
