//! Error types for the scope crate.

use thiserror::Error;

/// Errors that can occur when building, composing, decoding or evaluating scopes.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// Malformed DSL input or an out-of-range builder argument.
    #[error("{0}")]
    InvalidArgument(String),

    /// An operator name that is not in the alias table.
    #[error("unknown operator {name:?}")]
    UnknownOperator {
        name: String,
        #[source]
        source: UnregisteredOperator,
    },

    /// An ordering operator applied to values that have no common ordering.
    #[error("unable to compare {attribute:?} with operator {operator}: {actual} against {expected}")]
    IncomparableValues {
        attribute: String,
        operator: &'static str,
        actual: &'static str,
        expected: &'static str,
    },

    /// A serialized scope that does not follow the `as_json` schema.
    #[error("malformed scope: {0}")]
    MalformedScope(String),

    /// A criteria parser failure raised while building a query.
    #[error("unable to parse query: {message}")]
    Parse {
        message: String,
        #[source]
        source: Box<ScopeError>,
    },
}

impl ScopeError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        ScopeError::InvalidArgument(message.into())
    }

    pub(crate) fn unknown_operator(name: &str) -> Self {
        ScopeError::UnknownOperator {
            name: name.to_string(),
            source: UnregisteredOperator(name.to_string()),
        }
    }

    /// Wraps a parser failure so it surfaces as a query parse error.
    pub(crate) fn into_parse_error(self) -> Self {
        match self {
            already @ ScopeError::Parse { .. } => already,
            other => ScopeError::Parse {
                message: other.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// The lookup failure behind [`ScopeError::UnknownOperator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no operator registered under {0:?}")]
pub struct UnregisteredOperator(pub String);

/// Result type for scope operations.
pub type Result<T> = std::result::Result<T, ScopeError>;
