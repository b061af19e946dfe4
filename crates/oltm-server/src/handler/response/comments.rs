//! Comment response types.

use jiff::Timestamp;
use oltm_core as core;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Deepest nesting level serialized as nested `replies`.
///
/// Replies below this level are listed flat, in pre-order, under their
/// ancestor at this depth.
pub const MAX_THREAD_DEPTH: usize = 256;

/// Represents a single comment.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// ID of the comment.
    pub id: i64,
    /// Vehicle the comment belongs to.
    pub vehicle_id: Option<i64>,
    /// Post the comment belongs to.
    pub post_id: Option<i64>,
    /// ID of the author.
    pub author_id: i64,
    /// Username of the author.
    pub author_name: String,
    /// Parent comment ID for threaded replies.
    pub parent_comment_id: Option<i64>,
    /// Comment text.
    pub body: String,
    /// Timestamp when the comment was created.
    pub created_at: Timestamp,
}

impl Comment {
    /// Creates a Comment response from a domain comment.
    pub fn from_comment(comment: &core::Comment) -> Self {
        Self {
            id: comment.id.0,
            vehicle_id: comment.target.vehicle_id(),
            post_id: comment.target.post_id(),
            author_id: comment.author_id.0,
            author_name: comment.author_name.clone(),
            parent_comment_id: comment.parent_id.map(|id| id.0),
            body: comment.body.clone(),
            created_at: comment.created_at,
        }
    }

    /// Creates a list of Comment responses.
    pub fn from_comments(comments: &[core::Comment]) -> Vec<Self> {
        comments.iter().map(Self::from_comment).collect()
    }
}

/// Response for listing comments.
pub type Comments = Vec<Comment>;

/// A comment together with its nested replies.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreadNode {
    #[serde(flatten)]
    pub comment: Comment,
    /// Replies, newest first.
    pub replies: Vec<ThreadNode>,
}

impl ThreadNode {
    /// Converts an assembled forest into response nodes.
    pub fn from_forest(forest: &[core::ThreadNode]) -> Vec<Self> {
        Self::from_forest_with_depth(forest, MAX_THREAD_DEPTH)
    }

    fn from_forest_with_depth(forest: &[core::ThreadNode], max_depth: usize) -> Vec<Self> {
        // Each folded value is the list of nodes a comment contributes to its
        // parent: itself, plus its flattened descendants once past `max_depth`.
        let folded = core::ThreadNode::fold_forest(forest, |comment, depth, replies| {
            let replies: Vec<Self> = replies.into_iter().flatten().collect();
            let comment = Comment::from_comment(comment);

            if depth < max_depth {
                vec![Self { comment, replies }]
            } else {
                let mut flat = Vec::with_capacity(replies.len() + 1);
                flat.push(Self {
                    comment,
                    replies: Vec::new(),
                });
                flat.extend(replies);
                flat
            }
        });

        folded.into_iter().flatten().collect()
    }
}

/// Response for a comment thread.
pub type Thread = Vec<ThreadNode>;

/// Response returned after creating a comment.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct CommentCreated {
    /// ID of the new comment.
    pub id: i64,
}
