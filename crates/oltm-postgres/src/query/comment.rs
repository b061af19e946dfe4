//! Comment repository for threaded discussions on vehicles and posts.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{AuthoredComment, Comment, NewComment};
use crate::{PgClient, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for comment database operations.
///
/// Every read joins the author so callers get the username alongside the row.
pub trait CommentRepository {
    /// Inserts a comment and returns its id.
    fn create_comment(&self, new_comment: NewComment) -> impl Future<Output = PgResult<i64>> + Send;

    /// Finds a comment by id.
    fn find_comment_by_id(
        &self,
        comment_id: i64,
    ) -> impl Future<Output = PgResult<Option<AuthoredComment>>> + Send;

    /// Returns the `(vehicle_id, post_id)` pair a comment is attached to.
    fn find_comment_target(
        &self,
        comment_id: i64,
    ) -> impl Future<Output = PgResult<Option<(Option<i64>, Option<i64>)>>> + Send;

    /// Lists all comments on a vehicle, newest first.
    fn list_vehicle_comments(
        &self,
        vehicle_id: i64,
    ) -> impl Future<Output = PgResult<Vec<AuthoredComment>>> + Send;

    /// Lists all comments on a post, newest first.
    fn list_post_comments(
        &self,
        post_id: i64,
    ) -> impl Future<Output = PgResult<Vec<AuthoredComment>>> + Send;

    /// Lists direct replies of a comment, oldest first.
    fn list_comment_replies(
        &self,
        parent_id: i64,
    ) -> impl Future<Output = PgResult<Vec<AuthoredComment>>> + Send;
}

impl CommentRepository for PgClient {
    async fn create_comment(&self, new_comment: NewComment) -> PgResult<i64> {
        let mut conn = self.get_connection().await?;

        use schema::comments::{self, dsl};

        let comment_id = diesel::insert_into(comments::table)
            .values(&new_comment)
            .returning(dsl::id)
            .get_result(&mut **conn)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(target: TRACING_TARGET_QUERY, comment_id, "Comment inserted");
        Ok(comment_id)
    }

    async fn find_comment_by_id(&self, comment_id: i64) -> PgResult<Option<AuthoredComment>> {
        let mut conn = self.get_connection().await?;

        use schema::comments::{self, dsl};
        use schema::users;

        let comment = comments::table
            .inner_join(users::table)
            .filter(dsl::id.eq(comment_id))
            .select((Comment::as_select(), users::username))
            .first::<(Comment, String)>(&mut **conn)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(comment.map(AuthoredComment::from))
    }

    async fn find_comment_target(
        &self,
        comment_id: i64,
    ) -> PgResult<Option<(Option<i64>, Option<i64>)>> {
        let mut conn = self.get_connection().await?;

        use schema::comments::{self, dsl};

        comments::table
            .filter(dsl::id.eq(comment_id))
            .select((dsl::vehicle_id, dsl::post_id))
            .first(&mut **conn)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_vehicle_comments(&self, vehicle_id: i64) -> PgResult<Vec<AuthoredComment>> {
        let mut conn = self.get_connection().await?;

        use schema::comments::{self, dsl};
        use schema::users;

        let comments = comments::table
            .inner_join(users::table)
            .filter(dsl::vehicle_id.eq(vehicle_id))
            .order((dsl::created_at.desc(), dsl::id.desc()))
            .select((Comment::as_select(), users::username))
            .load::<(Comment, String)>(&mut **conn)
            .await
            .map_err(PgError::from)?;

        Ok(comments.into_iter().map(AuthoredComment::from).collect())
    }

    async fn list_post_comments(&self, post_id: i64) -> PgResult<Vec<AuthoredComment>> {
        let mut conn = self.get_connection().await?;

        use schema::comments::{self, dsl};
        use schema::users;

        let comments = comments::table
            .inner_join(users::table)
            .filter(dsl::post_id.eq(post_id))
            .order((dsl::created_at.desc(), dsl::id.desc()))
            .select((Comment::as_select(), users::username))
            .load::<(Comment, String)>(&mut **conn)
            .await
            .map_err(PgError::from)?;

        Ok(comments.into_iter().map(AuthoredComment::from).collect())
    }

    async fn list_comment_replies(&self, parent_id: i64) -> PgResult<Vec<AuthoredComment>> {
        let mut conn = self.get_connection().await?;

        use schema::comments::{self, dsl};
        use schema::users;

        let replies = comments::table
            .inner_join(users::table)
            .filter(dsl::parent_id.eq(parent_id))
            .order((dsl::created_at.asc(), dsl::id.asc()))
            .select((Comment::as_select(), users::username))
            .load::<(Comment, String)>(&mut **conn)
            .await
            .map_err(PgError::from)?;

        Ok(replies.into_iter().map(AuthoredComment::from).collect())
    }
}
