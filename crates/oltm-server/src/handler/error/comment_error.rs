//! Conversion from comment service errors to HTTP errors.

use oltm_core::{CommentError, StoreError};

use super::http_error::{Error as HttpError, ErrorKind};

/// Tracing target for comment error conversions.
const TRACING_TARGET: &str = "oltm_server::handler::comments";

impl From<CommentError> for HttpError<'static> {
    fn from(error: CommentError) -> Self {
        let kind = match &error {
            CommentError::InvalidTarget(_) => ErrorKind::InvalidTarget,
            CommentError::TargetNotFound(_) => ErrorKind::TargetNotFound,
            CommentError::BodyTooShort => ErrorKind::BodyTooShort,
            CommentError::ParentNotFound(_) => ErrorKind::ParentNotFound,
            CommentError::CrossThreadParent => ErrorKind::CrossThreadParent,
            CommentError::InvalidReference(_) => ErrorKind::InvalidReference,
            CommentError::CommentNotFound(_) => ErrorKind::CommentNotFound,
            CommentError::Internal {
                source: StoreError::Unavailable { .. },
                ..
            } => ErrorKind::ServiceUnavailable,
            CommentError::Internal { .. } => ErrorKind::InternalServerError,
        };

        if error.is_internal() {
            tracing::error!(
                target: TRACING_TARGET,
                error = %error,
                reason = error.reason(),
                "Comment operation failed"
            );
        } else {
            tracing::debug!(
                target: TRACING_TARGET,
                reason = error.reason(),
                "Comment request rejected"
            );
        }

        let resource = match &error {
            CommentError::TargetNotFound(target) => Some(target.kind().as_ref().to_owned()),
            CommentError::ParentNotFound(_) | CommentError::CommentNotFound(_) => {
                Some("comment".to_owned())
            }
            _ => None,
        };

        let mut http_error = kind.with_message(error.to_string());
        if let Some(resource) = resource {
            http_error = http_error.with_resource(resource);
        }

        if let CommentError::InvalidReference(source) | CommentError::Internal { source, .. } =
            &error
        {
            http_error = http_error.with_context(source.to_string());
        }

        http_error
    }
}
