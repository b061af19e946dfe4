//! Comment request types.

use oltm_core::{CommentCandidate, UserId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload for posting a comment or a reply.
///
/// Exactly one of `vehicleId` and `postId` must be set. The minimum body
/// length is checked after trimming, by the comment service.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    /// Vehicle to comment on.
    #[serde(default)]
    pub vehicle_id: Option<i64>,
    /// Post to comment on.
    #[serde(default)]
    pub post_id: Option<i64>,
    /// Comment text.
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub body: String,
    /// Parent comment ID for threaded replies.
    #[serde(default)]
    pub parent_comment_id: Option<i64>,
}

impl CreateComment {
    /// Converts the payload into an unvalidated comment candidate.
    pub fn into_candidate(self, author_id: UserId) -> CommentCandidate {
        CommentCandidate {
            vehicle_id: self.vehicle_id,
            post_id: self.post_id,
            parent_id: self.parent_comment_id,
            body: self.body,
            author_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case() -> anyhow::Result<()> {
        let request: CreateComment = serde_json::from_str(
            r#"{"postId": 4, "body": "first", "parentCommentId": 9}"#,
        )?;

        let candidate = request.into_candidate(UserId(3));
        assert_eq!(candidate.post_id, Some(4));
        assert_eq!(candidate.vehicle_id, None);
        assert_eq!(candidate.parent_id, Some(9));
        assert_eq!(candidate.author_id, UserId(3));
        Ok(())
    }

    #[test]
    fn missing_body_defaults_to_empty() -> anyhow::Result<()> {
        let request: CreateComment = serde_json::from_str(r#"{"vehicleId": 1}"#)?;
        assert!(request.body.is_empty());
        assert!(request.validate().is_ok());
        Ok(())
    }

    #[test]
    fn rejects_oversized_body() {
        let request = CreateComment {
            vehicle_id: Some(1),
            body: "x".repeat(5001),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
