//! Storage contracts consumed by the validator and the comment service.

use async_trait::async_trait;

use crate::comment::{Comment, CommentId, NewComment, Target};
use crate::error::StoreResult;
use crate::health::ServiceHealth;

/// Minimal view of a comment used to validate replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    pub id: CommentId,
    pub target: Target,
}

impl From<&Comment> for ParentRef {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            target: comment.target,
        }
    }
}

/// Read-only lookups the thread validator needs.
#[async_trait]
pub trait ThreadLookup: Send + Sync {
    /// Returns `true` if the vehicle or post exists.
    async fn target_exists(&self, target: Target) -> StoreResult<bool>;

    /// Resolves a comment id to its target, if the comment exists.
    async fn find_parent(&self, id: CommentId) -> StoreResult<Option<ParentRef>>;
}

/// Durable comment storage.
///
/// Implementations must enforce referential integrity atomically with the
/// insert and report failures as [`StoreError::Constraint`].
///
/// [`StoreError::Constraint`]: crate::StoreError::Constraint
#[async_trait]
pub trait CommentStore: ThreadLookup {
    /// Persists a validated comment and returns its id.
    async fn insert(&self, comment: NewComment) -> StoreResult<CommentId>;

    /// Fetches a single comment.
    async fn find_by_id(&self, id: CommentId) -> StoreResult<Option<Comment>>;

    /// Lists every comment of a target at any depth, in no particular order.
    async fn list_by_target(&self, target: Target) -> StoreResult<Vec<Comment>>;

    /// Lists direct replies of a comment, oldest first.
    async fn list_replies_of(&self, parent_id: CommentId) -> StoreResult<Vec<Comment>>;

    /// Probes the backing store.
    async fn health_check(&self) -> StoreResult<ServiceHealth>;
}
