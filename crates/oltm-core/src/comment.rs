//! Comment values and the resource they are attached to.

use derive_more::{Display, From, Into};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, IntoStaticStr};

/// Minimum number of characters a comment body must keep after trimming.
pub const BODY_MIN_CHARS: usize = 2;

/// Store-assigned comment identifier.
///
/// Identifiers are monotonic: a comment created later always has a larger id,
/// which is what makes id a valid tie-break for equal timestamps.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into,
    Serialize, Deserialize
)]
#[serde(transparent)]
pub struct CommentId(pub i64);

/// Identifier of an authenticated user.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into,
    Serialize, Deserialize
)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Kind of resource a thread hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum TargetKind {
    Vehicle,
    Post,
}

/// The resource a comment thread is attached to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Target {
    #[display("vehicle:{_0}")]
    #[serde(rename = "vehicleId")]
    Vehicle(i64),
    #[display("post:{_0}")]
    #[serde(rename = "postId")]
    Post(i64),
}

impl Target {
    /// Resolves a pair of optional resource ids into a single target.
    ///
    /// Non-positive ids count as absent.
    pub fn from_parts(vehicle_id: Option<i64>, post_id: Option<i64>) -> Result<Self, TargetError> {
        let vehicle_id = vehicle_id.filter(|id| *id > 0);
        let post_id = post_id.filter(|id| *id > 0);

        match (vehicle_id, post_id) {
            (None, None) => Err(TargetError::Missing),
            (Some(_), Some(_)) => Err(TargetError::Ambiguous),
            (Some(id), None) => Ok(Self::Vehicle(id)),
            (None, Some(id)) => Ok(Self::Post(id)),
        }
    }

    /// Returns the kind of resource.
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Vehicle(_) => TargetKind::Vehicle,
            Self::Post(_) => TargetKind::Post,
        }
    }

    /// Returns the capitalized resource name used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Vehicle(_) => "Vehicle",
            Self::Post(_) => "Post",
        }
    }

    /// Returns the raw resource id.
    pub fn id(&self) -> i64 {
        match self {
            Self::Vehicle(id) | Self::Post(id) => *id,
        }
    }

    /// Returns the vehicle id if this is a vehicle thread.
    pub fn vehicle_id(&self) -> Option<i64> {
        match self {
            Self::Vehicle(id) => Some(*id),
            Self::Post(_) => None,
        }
    }

    /// Returns the post id if this is a post thread.
    pub fn post_id(&self) -> Option<i64> {
        match self {
            Self::Post(id) => Some(*id),
            Self::Vehicle(_) => None,
        }
    }
}

/// Why a pair of resource ids does not name exactly one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("vehicleId or postId required")]
    Missing,
    #[error("Provide only one: vehicleId or postId")]
    Ambiguous,
}

/// A stored comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub target: Target,
    pub author_id: UserId,
    /// Username of the author at read time.
    pub author_name: String,
    pub parent_id: Option<CommentId>,
    pub body: String,
    pub created_at: Timestamp,
}

/// Unvalidated input for a new comment, as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentCandidate {
    pub vehicle_id: Option<i64>,
    pub post_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub body: String,
    /// Authenticated caller.
    pub author_id: UserId,
}

impl CommentCandidate {
    /// Creates a top-level candidate for the given target.
    pub fn new(target: Target, author_id: UserId, body: impl Into<String>) -> Self {
        Self {
            vehicle_id: target.vehicle_id(),
            post_id: target.post_id(),
            parent_id: None,
            body: body.into(),
            author_id,
        }
    }

    /// Turns the candidate into a reply to `parent_id`.
    pub fn with_parent(mut self, parent_id: CommentId) -> Self {
        self.parent_id = Some(parent_id.0);
        self
    }
}

/// A validated comment ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub target: Target,
    pub author_id: UserId,
    pub parent_id: Option<CommentId>,
    /// Trimmed body.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_from_single_id() {
        assert_eq!(Target::from_parts(Some(5), None), Ok(Target::Vehicle(5)));
        assert_eq!(Target::from_parts(None, Some(9)), Ok(Target::Post(9)));
    }

    #[test]
    fn target_requires_exactly_one_id() {
        assert_eq!(Target::from_parts(None, None), Err(TargetError::Missing));
        assert_eq!(Target::from_parts(Some(1), Some(2)), Err(TargetError::Ambiguous));
    }

    #[test]
    fn non_positive_ids_are_absent() {
        assert_eq!(Target::from_parts(Some(0), Some(3)), Ok(Target::Post(3)));
        assert_eq!(Target::from_parts(Some(-4), None), Err(TargetError::Missing));
    }

    #[test]
    fn target_accessors() {
        let target = Target::Vehicle(7);
        assert_eq!(target.kind(), TargetKind::Vehicle);
        assert_eq!(target.id(), 7);
        assert_eq!(target.vehicle_id(), Some(7));
        assert_eq!(target.post_id(), None);
        assert_eq!(target.to_string(), "vehicle:7");
    }
}
