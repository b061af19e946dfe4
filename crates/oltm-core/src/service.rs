//! Comment service: the public contract over a [`CommentStore`].

use std::sync::Arc;

use strum::IntoStaticStr;
use thiserror::Error;

use crate::TRACING_TARGET_SERVICE;
use crate::comment::{
    BODY_MIN_CHARS, Comment, CommentCandidate, CommentId, Target, TargetError,
};
use crate::error::{ConstraintKind, StoreError};
use crate::health::ServiceHealth;
use crate::store::CommentStore;
use crate::thread::{Rejection, ThreadNode, assemble, newest_first, validate};

/// Result type for [`CommentService`] operations.
pub type CommentResult<T, E = CommentError> = std::result::Result<T, E>;

/// Typed failures of the comment service.
///
/// Every variant except [`CommentError::Internal`] describes a caller mistake
/// and carries a user-facing message; [`CommentError::reason`] gives the
/// stable reason code.
#[derive(Debug, Error, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CommentError {
    #[error(transparent)]
    InvalidTarget(TargetError),

    #[error("{} not found", .0.label())]
    TargetNotFound(Target),

    #[error("Comment must be {BODY_MIN_CHARS}+ chars")]
    BodyTooShort,

    #[error("Parent comment not found")]
    ParentNotFound(CommentId),

    #[error("Parent comment belongs to a different thread")]
    CrossThreadParent,

    /// The store refused a reference that passed validation.
    #[error("Invalid reference")]
    InvalidReference(#[source] StoreError),

    #[error("Comment not found")]
    CommentNotFound(CommentId),

    /// Storage failure; the message is safe to show, the source is not.
    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl CommentError {
    /// Returns the stable reason code, e.g. `body_too_short`.
    #[inline]
    pub fn reason(&self) -> &'static str {
        self.into()
    }

    /// Returns `true` for storage failures.
    #[inline]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    fn internal(message: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| {
            tracing::error!(
                target: TRACING_TARGET_SERVICE,
                error = %source,
                "{message}"
            );
            Self::Internal { message, source }
        }
    }
}

impl From<Rejection> for CommentError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::InvalidTarget(error) => Self::InvalidTarget(error),
            Rejection::TargetNotFound(target) => Self::TargetNotFound(target),
            Rejection::BodyTooShort => Self::BodyTooShort,
            Rejection::ParentNotFound(id) => Self::ParentNotFound(id),
            Rejection::CrossThreadParent { .. } => Self::CrossThreadParent,
            Rejection::Lookup(source) => Self::internal("Failed to post comment")(source),
        }
    }
}

/// Creates and reads comment threads.
///
/// Cheap to clone; all clones share the injected store.
#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn CommentStore>,
}

impl CommentService {
    /// Creates a service over `store`.
    pub fn new<S>(store: S) -> Self
    where
        S: CommentStore + 'static,
    {
        Self {
            store: Arc::new(store),
        }
    }

    /// Lists every comment of a target, newest first, without nesting.
    #[tracing::instrument(skip_all, fields(thread = %target))]
    pub async fn list_flat(&self, target: Target) -> CommentResult<Vec<Comment>> {
        let mut comments = self
            .store
            .list_by_target(target)
            .await
            .map_err(CommentError::internal("Failed to load comments"))?;
        comments.sort_by(newest_first);
        Ok(comments)
    }

    /// Lists the comments of a target as a nested reply forest.
    #[tracing::instrument(skip_all, fields(thread = %target))]
    pub async fn list_thread(&self, target: Target) -> CommentResult<Vec<ThreadNode>> {
        let comments = self
            .store
            .list_by_target(target)
            .await
            .map_err(CommentError::internal("Failed to load thread"))?;

        let count = comments.len();
        let forest = assemble(comments);

        tracing::debug!(
            target: TRACING_TARGET_SERVICE,
            comments = count,
            roots = forest.len(),
            "Thread assembled"
        );

        Ok(forest)
    }

    /// Lists the direct replies of a comment, oldest first.
    #[tracing::instrument(skip_all, fields(parent_id = %parent_id))]
    pub async fn list_direct_replies(&self, parent_id: CommentId) -> CommentResult<Vec<Comment>> {
        self.store
            .list_replies_of(parent_id)
            .await
            .map_err(CommentError::internal("Failed to load replies"))
    }

    /// Fetches a single comment.
    #[tracing::instrument(skip_all, fields(comment_id = %id))]
    pub async fn get(&self, id: CommentId) -> CommentResult<Comment> {
        self.store
            .find_by_id(id)
            .await
            .map_err(CommentError::internal("Failed to load comment"))?
            .ok_or(CommentError::CommentNotFound(id))
    }

    /// Validates and stores a new comment, returning its id.
    #[tracing::instrument(skip_all, fields(author_id = %candidate.author_id))]
    pub async fn create(&self, candidate: CommentCandidate) -> CommentResult<CommentId> {
        let comment = match validate(candidate, self.store.as_ref()).await {
            Ok(comment) => comment,
            Err(rejection) => {
                tracing::debug!(
                    target: TRACING_TARGET_SERVICE,
                    reason = rejection.reason(),
                    "Comment rejected"
                );
                return Err(rejection.into());
            }
        };

        let target = comment.target;
        let parent_id = comment.parent_id;

        let id = self.store.insert(comment).await.map_err(|error| {
            match error.constraint_kind() {
                Some(ConstraintKind::ForeignKey | ConstraintKind::Check) => {
                    tracing::warn!(
                        target: TRACING_TARGET_SERVICE,
                        error = %error,
                        "Comment insert hit a reference constraint"
                    );
                    CommentError::InvalidReference(error)
                }
                Some(ConstraintKind::CrossThread) => CommentError::CrossThreadParent,
                Some(ConstraintKind::Unique) | None => {
                    CommentError::internal("Failed to post comment")(error)
                }
            }
        })?;

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            comment_id = %id,
            thread = %target,
            parent_id = ?parent_id.map(|id| id.0),
            "Comment created"
        );

        Ok(id)
    }

    /// Probes the underlying store.
    pub async fn health(&self) -> CommentResult<ServiceHealth> {
        self.store
            .health_check()
            .await
            .map_err(CommentError::internal("Health check failed"))
    }
}

impl std::fmt::Debug for CommentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use jiff::Timestamp;

    use super::*;
    use crate::comment::{NewComment, UserId};
    use crate::error::StoreResult;
    use crate::mock::MemoryStore;
    use crate::store::{ParentRef, ThreadLookup};

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_user(ALICE, "alice")
            .with_user(BOB, "bob")
            .with_vehicle(5)
            .with_vehicle(7)
            .with_post(9)
    }

    fn ids(comments: &[Comment]) -> Vec<i64> {
        comments.iter().map(|c| c.id.0).collect()
    }

    #[tokio::test]
    async fn create_then_read_back() -> anyhow::Result<()> {
        let service = CommentService::new(store());

        let id = service
            .create(CommentCandidate::new(Target::Vehicle(5), ALICE, "  nice paint  "))
            .await?;

        let comment = service.get(id).await?;
        assert_eq!(comment.body, "nice paint");
        assert_eq!(comment.author_name, "alice");
        assert_eq!(comment.target, Target::Vehicle(5));
        Ok(())
    }

    #[tokio::test]
    async fn body_length_boundary() -> anyhow::Result<()> {
        let service = CommentService::new(store());

        let error = service
            .create(CommentCandidate::new(Target::Vehicle(5), ALICE, " a"))
            .await
            .unwrap_err();
        assert!(matches!(error, CommentError::BodyTooShort));

        service
            .create(CommentCandidate::new(Target::Vehicle(5), ALICE, "ok"))
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn reply_cannot_jump_threads() {
        let store = store();
        let parent = store.seed_new(Target::Vehicle(5), ALICE, None, "root").await;
        let service = CommentService::new(store.clone());

        let error = service
            .create(CommentCandidate::new(Target::Vehicle(7), BOB, "hi").with_parent(parent))
            .await
            .unwrap_err();

        assert!(matches!(error, CommentError::CrossThreadParent));
        assert_eq!(error.reason(), "cross_thread_parent");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn list_flat_is_newest_first() -> anyhow::Result<()> {
        let store = store();
        let first = store.seed_new(Target::Vehicle(5), ALICE, None, "one").await;
        let second = store.seed_new(Target::Vehicle(5), BOB, Some(first), "two").await;
        let third = store.seed_new(Target::Vehicle(5), ALICE, None, "three").await;
        store.seed_new(Target::Vehicle(7), ALICE, None, "other").await;

        let service = CommentService::new(store);
        let flat = service.list_flat(Target::Vehicle(5)).await?;
        assert_eq!(ids(&flat), vec![third.0, second.0, first.0]);
        Ok(())
    }

    #[tokio::test]
    async fn list_flat_breaks_timestamp_ties_by_id() -> anyhow::Result<()> {
        let store = store();
        let created_at = Timestamp::from_second(1_000)?;
        for id in [3, 1, 2] {
            store.seed_raw(Comment {
                id: CommentId(id),
                target: Target::Post(9),
                author_id: ALICE,
                author_name: "alice".into(),
                parent_id: None,
                body: "same time".into(),
                created_at,
            });
        }

        let service = CommentService::new(store);
        let flat = service.list_flat(Target::Post(9)).await?;
        assert_eq!(ids(&flat), vec![3, 2, 1]);
        Ok(())
    }

    #[tokio::test]
    async fn list_thread_nests_replies() -> anyhow::Result<()> {
        let store = store();
        let first = store.seed_new(Target::Vehicle(5), ALICE, None, "one").await;
        let reply = store.seed_new(Target::Vehicle(5), BOB, Some(first), "two").await;
        let nested = store.seed_new(Target::Vehicle(5), ALICE, Some(reply), "three").await;
        let last = store.seed_new(Target::Vehicle(5), BOB, None, "four").await;

        let service = CommentService::new(store);
        let thread = service.list_thread(Target::Vehicle(5)).await?;

        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].id(), last);
        assert_eq!(thread[1].id(), first);
        assert_eq!(thread[1].replies[0].id(), reply);
        assert_eq!(thread[1].replies[0].replies[0].id(), nested);

        let again = service.list_thread(Target::Vehicle(5)).await?;
        assert_eq!(thread, again);
        Ok(())
    }

    #[tokio::test]
    async fn list_thread_keeps_orphans_as_roots() -> anyhow::Result<()> {
        let store = store();
        store.seed_raw(Comment {
            id: CommentId(50),
            target: Target::Post(9),
            author_id: ALICE,
            author_name: "alice".into(),
            parent_id: Some(CommentId(49)),
            body: "legacy".into(),
            created_at: Timestamp::from_second(10)?,
        });

        let service = CommentService::new(store);
        let thread = service.list_thread(Target::Post(9)).await?;
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].id(), CommentId(50));
        Ok(())
    }

    #[tokio::test]
    async fn direct_replies_are_oldest_first() -> anyhow::Result<()> {
        let store = store();
        let root = store.seed_new(Target::Post(9), ALICE, None, "root").await;
        let early = store.seed_new(Target::Post(9), BOB, Some(root), "early").await;
        let nested = store.seed_new(Target::Post(9), ALICE, Some(early), "nested").await;
        let late = store.seed_new(Target::Post(9), BOB, Some(root), "late").await;

        let service = CommentService::new(store);
        let replies = service.list_direct_replies(root).await?;
        assert_eq!(ids(&replies), vec![early.0, late.0]);

        let replies = service.list_direct_replies(early).await?;
        assert_eq!(ids(&replies), vec![nested.0]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_comment_is_not_found() {
        let service = CommentService::new(store());
        let error = service.get(CommentId(404)).await.unwrap_err();
        assert!(matches!(error, CommentError::CommentNotFound(CommentId(404))));
    }

    /// Passes validation but lets the store decide, like a concurrent delete
    /// between the lookup and the insert.
    struct StaleLookups(MemoryStore);

    #[async_trait]
    impl ThreadLookup for StaleLookups {
        async fn target_exists(&self, _target: Target) -> StoreResult<bool> {
            Ok(true)
        }

        async fn find_parent(&self, id: CommentId) -> StoreResult<Option<ParentRef>> {
            Ok(Some(ParentRef {
                id,
                target: Target::Vehicle(5),
            }))
        }
    }

    #[async_trait]
    impl CommentStore for StaleLookups {
        async fn insert(&self, comment: NewComment) -> StoreResult<CommentId> {
            self.0.insert(comment).await
        }

        async fn find_by_id(&self, id: CommentId) -> StoreResult<Option<Comment>> {
            self.0.find_by_id(id).await
        }

        async fn list_by_target(&self, target: Target) -> StoreResult<Vec<Comment>> {
            self.0.list_by_target(target).await
        }

        async fn list_replies_of(&self, parent_id: CommentId) -> StoreResult<Vec<Comment>> {
            self.0.list_replies_of(parent_id).await
        }

        async fn health_check(&self) -> StoreResult<ServiceHealth> {
            self.0.health_check().await
        }
    }

    #[tokio::test]
    async fn store_constraints_are_the_final_authority() {
        let store = store();
        store.remove_vehicle(5);
        let service = CommentService::new(StaleLookups(store.clone()));

        let error = service
            .create(CommentCandidate::new(Target::Vehicle(5), ALICE, "too late"))
            .await
            .unwrap_err();
        assert!(matches!(error, CommentError::InvalidReference(_)));
        assert_eq!(error.to_string(), "Invalid reference");

        let error = service
            .create(
                CommentCandidate::new(Target::Vehicle(5), ALICE, "dangling")
                    .with_parent(CommentId(1234)),
            )
            .await
            .unwrap_err();
        assert_eq!(error.reason(), "invalid_reference");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn store_side_thread_check_maps_to_cross_thread() {
        let store = store();
        let parent = store.seed_new(Target::Vehicle(7), ALICE, None, "seven").await;
        let service = CommentService::new(StaleLookups(store.clone()));

        let error = service
            .create(CommentCandidate::new(Target::Vehicle(5), ALICE, "five").with_parent(parent))
            .await
            .unwrap_err();
        assert!(matches!(error, CommentError::CrossThreadParent));
    }

    #[tokio::test]
    async fn storage_outage_is_internal_and_opaque() -> anyhow::Result<()> {
        let store = store();
        store.set_offline(true);
        let service = CommentService::new(store.clone());

        let error = service
            .create(CommentCandidate::new(Target::Vehicle(5), ALICE, "hello"))
            .await
            .unwrap_err();
        assert!(error.is_internal());
        assert_eq!(error.to_string(), "Failed to post comment");

        let error = service.list_thread(Target::Vehicle(5)).await.unwrap_err();
        assert_eq!(error.reason(), "internal");

        assert!(!service.health().await?.is_operational());
        Ok(())
    }
}
