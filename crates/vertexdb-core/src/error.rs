use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without structured detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a plan-origin invariant violation carrying one defect reason.
    pub(crate) fn plan_defect(operator: &str, defect: PlanDefect) -> Self {
        Self {
            class: ErrorClass::InvariantViolation,
            origin: ErrorOrigin::Plan,
            message: format!("{operator}: {defect}"),
            detail: Some(ErrorDetail::Plan(defect)),
        }
    }

    /// Construct an executor-origin invariant violation.
    pub(crate) fn executor_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Executor,
            message.into(),
        )
    }

    /// Construct a table-origin invariant violation.
    pub(crate) fn table_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Table,
            message.into(),
        )
    }

    /// Construct a graph-origin invariant violation.
    pub(crate) fn graph_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Graph,
            message.into(),
        )
    }

    /// Construct an aggregate-origin invariant violation.
    pub(crate) fn aggregate_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Aggregate,
            message.into(),
        )
    }

    /// Construct an aggregate-origin unsupported error.
    pub(crate) fn aggregate_unsupported(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Aggregate,
            message.into(),
        )
    }

    pub(crate) fn aggregate_invalid(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvalidParameter,
            ErrorOrigin::Aggregate,
            message.into(),
        )
    }

    pub(crate) fn graph_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, ErrorOrigin::Graph, message.into())
    }

    pub(crate) fn remote_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, ErrorOrigin::Remote, message.into())
    }

    /// Construct an expression-origin unsupported error.
    pub(crate) fn expression_unsupported(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Expression,
            message.into(),
        )
    }

    /// Construct an expression-origin invalid-parameter error.
    pub(crate) fn expression_invalid(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvalidParameter,
            ErrorOrigin::Expression,
            message.into(),
        )
    }

    /// Construct a plan-origin invalid-parameter error.
    pub(crate) fn plan_invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvalidParameter,
            ErrorOrigin::Plan,
            message.into(),
        )
    }

    /// True when the error signals a planner or initialization defect.
    ///
    /// Configuration defects abort the query step and are never retried;
    /// every other class describes a data-dependent or environmental
    /// condition.
    #[must_use]
    pub const fn is_configuration_defect(&self) -> bool {
        matches!(self.class, ErrorClass::InvariantViolation)
    }

    #[must_use]
    pub const fn plan_defect_detail(&self) -> Option<&PlanDefect> {
        match &self.detail {
            Some(ErrorDetail::Plan(defect)) => Some(defect),
            None => None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Plan(PlanDefect),
}

///
/// PlanDefect
///
/// Reasons a scan plan is rejected during executor initialization.
/// Never returned directly; always wrapped in [`ErrorDetail::Plan`].
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PlanDefect {
    #[error("plan node is a {found}, expected a vertex scan")]
    WrongNodeShape { found: &'static str },

    #[error("scan is not a subquery and has no target graph view")]
    MissingGraphView,

    #[error("subquery scan requires exactly one child, found {found}")]
    SubqueryChildCount { found: usize },

    #[error(
        "projection declares {expressions} expressions but {columns} output columns (expected expressions + 2)"
    )]
    ProjectionWidth { expressions: usize, columns: usize },

    #[error("inline projection needs a graph view for degree lookups")]
    MissingDegreeSource,
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidParameter,
    InvariantViolation,
    NotFound,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidParameter => "invalid_parameter",
            Self::InvariantViolation => "invariant_violation",
            Self::NotFound => "not_found",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Aggregate,
    Executor,
    Expression,
    Graph,
    Plan,
    Remote,
    Table,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Aggregate => "aggregate",
            Self::Executor => "executor",
            Self::Expression => "expression",
            Self::Graph => "graph",
            Self::Plan => "plan",
            Self::Remote => "remote",
            Self::Table => "table",
        };
        write!(f, "{label}")
    }
}
