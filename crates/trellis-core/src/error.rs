use crate::{config::ConfigError, db::relation::RelationError, types::IdError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Returned from setup and registry paths; index and relation operations
/// return their own narrower error enums, which convert into this one.
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
    /// Construct an InternalError without a structured detail payload.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct an index uniqueness violation conflict error.
    ///
    /// Index types never raise this themselves; it comes from the registry's
    /// uniqueness check before a write is applied.
    pub fn index_violation(name: &str, fields: &[&str]) -> Self {
        Self::new(
            ErrorClass::Conflict,
            ErrorOrigin::Index,
            format!("index constraint violation: {name} ({})", fields.join(", ")),
        )
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self.class, ErrorClass::Conflict)
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
    Index(IndexError),

    #[error("{0}")]
    Relation(RelationError),

    #[error("{0}")]
    Config(ConfigError),

    #[error("{0}")]
    Identity(IdError),
}

impl From<IndexError> for InternalError {
    fn from(err: IndexError) -> Self {
        let class = match err {
            IndexError::Arity { .. }
            | IndexError::ComponentCount { .. }
            | IndexError::ReadOnly { .. } => ErrorClass::InvariantViolation,
            IndexError::Unsupported { .. } => ErrorClass::Unsupported,
        };

        Self {
            class,
            origin: ErrorOrigin::Index,
            message: err.to_string(),
            detail: Some(ErrorDetail::Index(err)),
        }
    }
}

impl From<RelationError> for InternalError {
    fn from(err: RelationError) -> Self {
        Self {
            class: ErrorClass::NotFound,
            origin: ErrorOrigin::Relation,
            message: err.to_string(),
            detail: Some(ErrorDetail::Relation(err)),
        }
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self {
            class: ErrorClass::Unsupported,
            origin: ErrorOrigin::Config,
            message: err.to_string(),
            detail: Some(ErrorDetail::Config(err)),
        }
    }
}

impl From<IdError> for InternalError {
    fn from(err: IdError) -> Self {
        Self {
            class: ErrorClass::Internal,
            origin: ErrorOrigin::Identity,
            message: err.to_string(),
            detail: Some(ErrorDetail::Identity(err)),
        }
    }
}

///
/// IndexError
///
/// Synchronous caller-bug failures raised by index mutators and lookups.
/// Absent keys are never errors.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum IndexError {
    #[error("index arity mismatch: expected {expected} key components, found {found}")]
    Arity { expected: usize, found: usize },

    #[error("composite index needs 1..={max} key components, found {found}")]
    ComponentCount { found: usize, max: usize },

    #[error("{target} is read-only outside add()/delete()")]
    ReadOnly { target: &'static str },

    #[error("{target} does not support {op}()")]
    Unsupported {
        op: &'static str,
        target: &'static str,
    },
}

impl IndexError {
    pub(crate) const fn arity(expected: usize, found: usize) -> Self {
        Self::Arity { expected, found }
    }

    /// Short label used for rejected-mutation metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Arity { .. } => "arity",
            Self::ComponentCount { .. } => "component_count",
            Self::ReadOnly { .. } => "read_only",
            Self::Unsupported { .. } => "unsupported",
        }
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Internal,
    Conflict,
    Unsupported,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Internal => "internal",
            Self::Conflict => "conflict",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
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
    Index,
    Relation,
    Config,
    Identity,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Index => "index",
            Self::Relation => "relation",
            Self::Config => "config",
            Self::Identity => "identity",
        };
        write!(f, "{label}")
    }
}
