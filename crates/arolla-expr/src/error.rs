//! Errors raised while building, rewriting and lowering expressions.

use arolla_core::{QType, QTypeError};

/// Result type for expression operations.
pub type Result<T> = std::result::Result<T, ExprError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ExprError {
    /// Name lookup failed (operator resolution error).
    #[error("operator {0:?} is not registered")]
    OperatorNotFound(String),

    #[error("operator {0:?} is already registered")]
    AlreadyRegistered(String),

    #[error("operator {0:?} is not an overloaded operator")]
    NotOverloaded(String),

    /// No overload accepts the argument qtypes. `arguments` lists them
    /// positionally as `name: QTYPE`.
    #[error("{operator}: no matching overload [{arguments}]")]
    NoMatchingOverload {
        operator: String,
        arguments: String,
        qtypes: Vec<QType>,
    },

    /// The operator's qtype rule rejected its inputs.
    #[error("{operator}: {message}")]
    TypeMismatch { operator: String, message: String },

    /// Arguments do not bind to the operator signature.
    #[error("{operator}: {message}")]
    Binding { operator: String, message: String },

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("{operator}: lambda body uses P.{placeholder}, which is not a parameter")]
    UnknownPlaceholder {
        operator: String,
        placeholder: String,
    },

    /// A dummy operator reached execution.
    #[error("{operator}: operator has no implementation")]
    ImplementationMissing { operator: String },

    #[error("{operator}: expansion deeper than {limit} levels")]
    RecursionLimitExceeded { operator: String, limit: usize },

    #[error("registry backing late-bound operator {0:?} no longer exists")]
    RegistryDropped(String),

    #[error(transparent)]
    QType(#[from] QTypeError),
}

impl ExprError {
    /// Errors meaning "these inputs have the wrong qtypes", as opposed to
    /// structural failures that must always propagate.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            Self::NoMatchingOverload { .. } | Self::TypeMismatch { .. } | Self::QType(_)
        )
    }

    /// Name of the operator the error is attributed to, if any.
    pub fn operator(&self) -> Option<&str> {
        match self {
            Self::NoMatchingOverload { operator, .. }
            | Self::TypeMismatch { operator, .. }
            | Self::Binding { operator, .. }
            | Self::UnknownPlaceholder { operator, .. }
            | Self::ImplementationMissing { operator }
            | Self::RecursionLimitExceeded { operator, .. } => Some(operator),
            Self::OperatorNotFound(name)
            | Self::AlreadyRegistered(name)
            | Self::NotOverloaded(name)
            | Self::RegistryDropped(name) => Some(name),
            Self::InvalidSignature(_) | Self::QType(_) => None,
        }
    }
}
