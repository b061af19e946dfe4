//! Storage error definitions.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for [`CommentStore`] operations.
///
/// [`CommentStore`]: crate::CommentStore
pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;

/// Category of a storage-level constraint failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ConstraintKind {
    /// A referenced target, parent or author does not exist (anymore).
    ForeignKey,
    /// The parent belongs to a different target.
    CrossThread,
    /// A check constraint on the row itself failed.
    Check,
    /// A uniqueness constraint failed.
    Unique,
}

/// Errors reported by a comment store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The write was rejected by a storage constraint.
    #[error("constraint violation ({}): {constraint}", kind.as_ref())]
    Constraint {
        kind: ConstraintKind,
        constraint: String,
    },

    /// The store could not be reached or timed out.
    #[error("store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    /// Anything else.
    #[error("unexpected store error: {message}")]
    Unexpected {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },
}

impl StoreError {
    /// Creates a constraint violation.
    pub fn constraint(kind: ConstraintKind, constraint: impl Into<String>) -> Self {
        Self::Constraint {
            kind,
            constraint: constraint.into(),
        }
    }

    /// Creates an unavailable error with the given source.
    pub fn unavailable(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an unexpected error without a source.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to an unexpected error.
    pub fn with_source(self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        match self {
            Self::Unexpected { message, .. } => Self::Unexpected {
                message,
                source: Some(Box::new(source)),
            },
            Self::Unavailable { message, .. } => Self::Unavailable {
                message,
                source: Some(Box::new(source)),
            },
            other => other,
        }
    }

    /// Returns the constraint kind if this is a constraint violation.
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            Self::Constraint { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
