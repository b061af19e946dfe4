//! [`CommentStore`] backed by PostgreSQL.

use async_trait::async_trait;
use oltm_core::{
    Comment, CommentId, CommentStore, ConstraintKind, NewComment, ParentRef, ServiceHealth,
    StoreError, StoreResult, Target, ThreadLookup, UserId,
};
use oltm_postgres::query::{CommentRepository, TargetRepository};
use oltm_postgres::types::{CommentConstraints, ConstraintCategory, ConstraintViolation};
use oltm_postgres::{PgClient, PgError, model};

/// Tracing target for the Postgres comment store.
const TRACING_TARGET: &str = "oltm_server::service::comment_store";

/// Comment store over a pooled [`PgClient`].
#[derive(Debug, Clone)]
pub struct PgCommentStore {
    pg_client: PgClient,
}

impl PgCommentStore {
    pub fn new(pg_client: PgClient) -> Self {
        Self { pg_client }
    }

    #[inline]
    pub fn pg_client(&self) -> &PgClient {
        &self.pg_client
    }
}

/// Translates a database failure into the store vocabulary.
fn store_error(error: PgError) -> StoreError {
    if let Some(violation) = error.constraint_violation() {
        let kind = match violation {
            ConstraintViolation::Comments(CommentConstraints::ParentSameThread) => {
                ConstraintKind::CrossThread
            }
            _ => match violation.categorize() {
                ConstraintCategory::Reference => ConstraintKind::ForeignKey,
                ConstraintCategory::Uniqueness => ConstraintKind::Unique,
                ConstraintCategory::Validation
                | ConstraintCategory::Chronological
                | ConstraintCategory::BusinessLogic => ConstraintKind::Check,
            },
        };
        return StoreError::constraint(kind, violation.to_string());
    }

    let constraint = error.constraint().unwrap_or("unknown").to_owned();
    if error.is_foreign_key_violation() {
        return StoreError::constraint(ConstraintKind::ForeignKey, constraint);
    }
    if error.is_check_violation() {
        return StoreError::constraint(ConstraintKind::Check, constraint);
    }
    if error.is_unique_violation() {
        return StoreError::constraint(ConstraintKind::Unique, constraint);
    }

    match error {
        PgError::Timeout(_) | PgError::Connection(_) => {
            StoreError::unavailable("database unavailable", error)
        }
        other => StoreError::unexpected("database query failed").with_source(other),
    }
}

/// Converts a joined row into a domain comment.
fn into_comment(row: model::AuthoredComment) -> StoreResult<Comment> {
    let model::AuthoredComment {
        comment,
        author_name,
    } = row;

    let target = Target::from_parts(comment.vehicle_id, comment.post_id).map_err(|e| {
        StoreError::unexpected(format!("comment {} has no single target", comment.id))
            .with_source(e)
    })?;

    let created_at = comment.created_at();
    Ok(Comment {
        id: CommentId(comment.id),
        target,
        author_id: UserId(comment.author_id),
        author_name,
        parent_id: comment.parent_id.map(CommentId),
        body: comment.body,
        created_at,
    })
}

fn into_comments(rows: Vec<model::AuthoredComment>) -> StoreResult<Vec<Comment>> {
    rows.into_iter().map(into_comment).collect()
}

#[async_trait]
impl ThreadLookup for PgCommentStore {
    async fn target_exists(&self, target: Target) -> StoreResult<bool> {
        let exists = match target {
            Target::Vehicle(id) => self.pg_client.vehicle_exists(id).await,
            Target::Post(id) => self.pg_client.post_exists(id).await,
        };
        exists.map_err(store_error)
    }

    async fn find_parent(&self, id: CommentId) -> StoreResult<Option<ParentRef>> {
        let Some((vehicle_id, post_id)) = self
            .pg_client
            .find_comment_target(id.0)
            .await
            .map_err(store_error)?
        else {
            return Ok(None);
        };

        let target = Target::from_parts(vehicle_id, post_id).map_err(|e| {
            StoreError::unexpected(format!("comment {id} has no single target")).with_source(e)
        })?;
        Ok(Some(ParentRef { id, target }))
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn insert(&self, comment: NewComment) -> StoreResult<CommentId> {
        let new_comment = model::NewComment {
            vehicle_id: comment.target.vehicle_id(),
            post_id: comment.target.post_id(),
            author_id: comment.author_id.0,
            parent_id: comment.parent_id.map(|id| id.0),
            body: comment.body,
        };

        let id = self
            .pg_client
            .create_comment(new_comment)
            .await
            .map_err(store_error)?;
        Ok(CommentId(id))
    }

    async fn find_by_id(&self, id: CommentId) -> StoreResult<Option<Comment>> {
        self.pg_client
            .find_comment_by_id(id.0)
            .await
            .map_err(store_error)?
            .map(into_comment)
            .transpose()
    }

    async fn list_by_target(&self, target: Target) -> StoreResult<Vec<Comment>> {
        let rows = match target {
            Target::Vehicle(id) => self.pg_client.list_vehicle_comments(id).await,
            Target::Post(id) => self.pg_client.list_post_comments(id).await,
        };
        into_comments(rows.map_err(store_error)?)
    }

    async fn list_replies_of(&self, parent_id: CommentId) -> StoreResult<Vec<Comment>> {
        let rows = self
            .pg_client
            .list_comment_replies(parent_id.0)
            .await
            .map_err(store_error)?;
        into_comments(rows)
    }

    async fn health_check(&self) -> StoreResult<ServiceHealth> {
        match self.pg_client.ping().await {
            Ok(elapsed) => {
                let status = self.pg_client.pool_status();
                let health = if status.is_under_pressure() {
                    ServiceHealth::degraded("connection pool under pressure")
                } else {
                    ServiceHealth::healthy()
                };
                Ok(health.with_response_time(elapsed))
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Database health probe failed"
                );
                Ok(ServiceHealth::unhealthy(error.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use oltm_postgres::error::TimeoutType;

    use super::*;

    #[test]
    fn timeouts_are_unavailable() {
        let error = store_error(PgError::Timeout(TimeoutType::Wait));
        assert!(matches!(error, StoreError::Unavailable { .. }));
    }

    #[test]
    fn unclassified_errors_are_unexpected() {
        let error = store_error(PgError::Unexpected("boom".into()));
        assert!(matches!(error, StoreError::Unexpected { .. }));
        assert_eq!(error.constraint_kind(), None);
    }
}
