//! Compilation and execution errors.

use arolla_core::QType;
use arolla_expr::operator::KernelError;
use arolla_expr::ExprError;

pub type Result<T> = std::result::Result<T, EvalError>;

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Dispatch, type inference or lowering failed.
    #[error(transparent)]
    Expr(#[from] ExprError),

    #[error("no qtype given for leaf L.{0}")]
    UnboundLeaf(String),

    #[error("leaf L.{key} is declared as {declared}, input qtype is {input}")]
    LeafQTypeConflict {
        key: String,
        declared: QType,
        input: QType,
    },

    #[error("placeholder P.{0} cannot be compiled")]
    Placeholder(String),

    #[error("{operator}: output qtype is unknown after lowering")]
    UnresolvedQType { operator: String },

    #[error("missing input L.{0}")]
    MissingInput(String),

    /// Execution inputs must match the compiled signature exactly.
    #[error("input L.{key}: expected {expected}, got {actual}")]
    InputQTypeMismatch {
        key: String,
        expected: QType,
        actual: QType,
    },

    /// A kernel failed. `operator` names the failing operator; the kernel's
    /// error is the source.
    #[error("{operator}: {source}")]
    Evaluation {
        operator: String,
        #[source]
        source: KernelError,
    },

    #[error("{operator}: kernel returned {actual}, expected {expected}")]
    KernelOutputMismatch {
        operator: String,
        expected: QType,
        actual: QType,
    },
}

impl EvalError {
    /// Operator the error originates from, if any.
    pub fn operator(&self) -> Option<&str> {
        match self {
            Self::Expr(err) => err.operator(),
            Self::UnresolvedQType { operator }
            | Self::Evaluation { operator, .. }
            | Self::KernelOutputMismatch { operator, .. } => Some(operator),
            _ => None,
        }
    }
}
