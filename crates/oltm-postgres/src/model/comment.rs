//! Comment model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::comments;

/// A comment row attached to exactly one vehicle or post.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    /// Unique comment identifier, increasing with insertion order.
    pub id: i64,
    /// Vehicle the comment is attached to.
    pub vehicle_id: Option<i64>,
    /// Post the comment is attached to.
    pub post_id: Option<i64>,
    /// User who wrote the comment.
    pub author_id: i64,
    /// Parent comment for replies (NULL for top-level comments).
    pub parent_id: Option<i64>,
    /// Comment text.
    pub body: String,
    /// Timestamp when the comment was created.
    pub created_at: Timestamp,
}

/// Data for creating a new comment.
#[derive(Debug, Clone, Default, Insertable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewComment {
    pub vehicle_id: Option<i64>,
    pub post_id: Option<i64>,
    pub author_id: i64,
    pub parent_id: Option<i64>,
    pub body: String,
}

/// A comment joined with its author's username.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoredComment {
    pub comment: Comment,
    pub author_name: String,
}

impl Comment {
    /// Returns the creation time as a [`jiff::Timestamp`].
    #[inline]
    pub fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}

impl From<(Comment, String)> for AuthoredComment {
    #[inline]
    fn from((comment, author_name): (Comment, String)) -> Self {
        Self {
            comment,
            author_name,
        }
    }
}
