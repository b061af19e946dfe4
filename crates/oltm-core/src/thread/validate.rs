//! Write-time checks for new comments.

use strum::IntoStaticStr;
use thiserror::Error;

use crate::comment::{
    BODY_MIN_CHARS, CommentCandidate, CommentId, NewComment, Target, TargetError,
};
use crate::error::StoreError;
use crate::store::{ParentRef, ThreadLookup};

/// Reasons a candidate comment is refused.
#[derive(Debug, Error, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Rejection {
    /// Neither or both of vehicle and post were given.
    #[error(transparent)]
    InvalidTarget(#[from] TargetError),

    /// The vehicle or post does not exist.
    #[error("{} not found", .0.label())]
    TargetNotFound(Target),

    /// The trimmed body is shorter than [`BODY_MIN_CHARS`].
    #[error("Comment must be {BODY_MIN_CHARS}+ chars")]
    BodyTooShort,

    /// The referenced parent comment does not exist.
    #[error("Parent comment not found")]
    ParentNotFound(CommentId),

    /// The parent comment belongs to another target.
    #[error("Parent comment belongs to a different thread")]
    CrossThreadParent { parent: ParentRef, target: Target },

    /// A lookup against the store failed.
    #[error("thread lookup failed")]
    Lookup(#[from] StoreError),
}

impl Rejection {
    /// Returns the stable reason code.
    #[inline]
    pub fn reason(&self) -> &'static str {
        self.into()
    }
}

/// Checks whether `candidate` may be stored and returns its normalized form.
///
/// Shape and body checks run first and never touch the store. Passing does
/// not guarantee the insert succeeds: the target or parent may disappear
/// before the write, which the store reports as a constraint violation.
pub async fn validate<L>(candidate: CommentCandidate, lookups: &L) -> Result<NewComment, Rejection>
where
    L: ThreadLookup + ?Sized,
{
    let target = Target::from_parts(candidate.vehicle_id, candidate.post_id)?;

    let body = candidate.body.trim();
    if body.chars().count() < BODY_MIN_CHARS {
        return Err(Rejection::BodyTooShort);
    }

    if !lookups.target_exists(target).await? {
        return Err(Rejection::TargetNotFound(target));
    }

    let parent_id = candidate.parent_id.filter(|id| *id > 0).map(CommentId);
    if let Some(parent_id) = parent_id {
        let parent = lookups
            .find_parent(parent_id)
            .await?
            .ok_or(Rejection::ParentNotFound(parent_id))?;

        if parent.target != target {
            return Err(Rejection::CrossThreadParent { parent, target });
        }
    }

    Ok(NewComment {
        target,
        author_id: candidate.author_id,
        parent_id,
        body: body.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::UserId;
    use crate::mock::MemoryStore;

    const ALICE: UserId = UserId(1);

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_user(ALICE, "alice")
            .with_vehicle(5)
            .with_vehicle(7)
            .with_post(3)
    }

    #[tokio::test]
    async fn accepts_and_trims_body() -> anyhow::Result<()> {
        let store = store();
        let candidate = CommentCandidate::new(Target::Vehicle(5), ALICE, "  ok  ");

        let comment = validate(candidate, &store).await?;
        assert_eq!(comment.body, "ok");
        assert_eq!(comment.target, Target::Vehicle(5));
        assert_eq!(comment.parent_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_short_body() {
        let store = store();
        let candidate = CommentCandidate::new(Target::Vehicle(5), ALICE, " a");

        let rejection = validate(candidate, &store).await.unwrap_err();
        assert!(matches!(rejection, Rejection::BodyTooShort));
        assert_eq!(rejection.reason(), "body_too_short");
        assert_eq!(rejection.to_string(), "Comment must be 2+ chars");
    }

    #[tokio::test]
    async fn counts_characters_not_bytes() -> anyhow::Result<()> {
        let store = store();
        let candidate = CommentCandidate::new(Target::Vehicle(5), ALICE, " é ");
        assert!(matches!(
            validate(candidate, &store).await,
            Err(Rejection::BodyTooShort)
        ));

        let candidate = CommentCandidate::new(Target::Vehicle(5), ALICE, "éé");
        validate(candidate, &store).await?;
        Ok(())
    }

    #[tokio::test]
    async fn rejects_missing_or_double_target() {
        let store = store();

        let mut candidate = CommentCandidate::new(Target::Vehicle(5), ALICE, "hello");
        candidate.vehicle_id = None;
        let rejection = validate(candidate.clone(), &store).await.unwrap_err();
        assert!(matches!(
            rejection,
            Rejection::InvalidTarget(TargetError::Missing)
        ));
        assert_eq!(rejection.reason(), "invalid_target");

        candidate.vehicle_id = Some(5);
        candidate.post_id = Some(3);
        let rejection = validate(candidate, &store).await.unwrap_err();
        assert!(matches!(
            rejection,
            Rejection::InvalidTarget(TargetError::Ambiguous)
        ));
    }

    #[tokio::test]
    async fn shape_errors_win_over_lookups() {
        let store = store();
        let mut candidate = CommentCandidate::new(Target::Vehicle(404), ALICE, "x");
        candidate.parent_id = Some(999);

        assert!(matches!(
            validate(candidate, &store).await,
            Err(Rejection::BodyTooShort)
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_target() {
        let store = store();

        let candidate = CommentCandidate::new(Target::Vehicle(404), ALICE, "hello");
        let rejection = validate(candidate, &store).await.unwrap_err();
        assert!(matches!(rejection, Rejection::TargetNotFound(Target::Vehicle(404))));
        assert_eq!(rejection.to_string(), "Vehicle not found");

        let candidate = CommentCandidate::new(Target::Post(404), ALICE, "hello");
        let rejection = validate(candidate, &store).await.unwrap_err();
        assert_eq!(rejection.to_string(), "Post not found");
    }

    #[tokio::test]
    async fn rejects_unknown_parent() {
        let store = store();
        let candidate =
            CommentCandidate::new(Target::Vehicle(5), ALICE, "hello").with_parent(CommentId(42));

        let rejection = validate(candidate, &store).await.unwrap_err();
        assert!(matches!(rejection, Rejection::ParentNotFound(CommentId(42))));
    }

    #[tokio::test]
    async fn rejects_parent_from_another_vehicle() -> anyhow::Result<()> {
        let store = store();
        let parent = store
            .seed_new(Target::Vehicle(5), ALICE, None, "on five")
            .await;

        let candidate =
            CommentCandidate::new(Target::Vehicle(7), ALICE, "on seven").with_parent(parent);
        let rejection = validate(candidate, &store).await.unwrap_err();

        assert!(matches!(
            rejection,
            Rejection::CrossThreadParent {
                target: Target::Vehicle(7),
                ..
            }
        ));
        assert_eq!(rejection.reason(), "cross_thread_parent");
        Ok(())
    }

    #[tokio::test]
    async fn rejects_parent_from_a_post_with_the_same_id() {
        let store = MemoryStore::new()
            .with_user(ALICE, "alice")
            .with_vehicle(3)
            .with_post(3);
        let parent = store.seed_new(Target::Post(3), ALICE, None, "post").await;

        let candidate =
            CommentCandidate::new(Target::Vehicle(3), ALICE, "vehicle").with_parent(parent);
        assert!(matches!(
            validate(candidate, &store).await,
            Err(Rejection::CrossThreadParent { .. })
        ));
    }

    #[tokio::test]
    async fn accepts_reply_in_same_thread() -> anyhow::Result<()> {
        let store = store();
        let parent = store.seed_new(Target::Post(3), ALICE, None, "root").await;

        let candidate =
            CommentCandidate::new(Target::Post(3), ALICE, "reply").with_parent(parent);
        let comment = validate(candidate, &store).await?;
        assert_eq!(comment.parent_id, Some(parent));
        Ok(())
    }

    #[tokio::test]
    async fn non_positive_parent_is_top_level() -> anyhow::Result<()> {
        let store = store();
        let mut candidate = CommentCandidate::new(Target::Vehicle(5), ALICE, "hello");
        candidate.parent_id = Some(0);

        let comment = validate(candidate, &store).await?;
        assert_eq!(comment.parent_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn lookup_failures_are_reported() {
        let store = store();
        store.set_offline(true);

        let candidate = CommentCandidate::new(Target::Vehicle(5), ALICE, "hello");
        assert!(matches!(
            validate(candidate, &store).await,
            Err(Rejection::Lookup(StoreError::Unavailable { .. }))
        ));
    }
}
