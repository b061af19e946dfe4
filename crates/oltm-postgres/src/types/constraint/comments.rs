//! Comments table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Comments table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum CommentConstraints {
    // Row shape
    #[strum(serialize = "comments_one_target")]
    OneTarget,
    #[strum(serialize = "comments_body_length")]
    BodyLength,

    // Threading
    #[strum(serialize = "comments_parent_before_child")]
    ParentBeforeChild,
    #[strum(serialize = "comments_parent_same_thread")]
    ParentSameThread,

    // Foreign keys
    #[strum(serialize = "comments_vehicle_id_fkey")]
    VehicleReference,
    #[strum(serialize = "comments_post_id_fkey")]
    PostReference,
    #[strum(serialize = "comments_author_id_fkey")]
    AuthorReference,
    #[strum(serialize = "comments_parent_id_fkey")]
    ParentReference,

    #[strum(serialize = "comments_pkey")]
    PrimaryKey,
}

impl CommentConstraints {
    /// Creates a new [`CommentConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            CommentConstraints::OneTarget | CommentConstraints::BodyLength => {
                ConstraintCategory::Validation
            }

            CommentConstraints::ParentBeforeChild => ConstraintCategory::Chronological,

            CommentConstraints::ParentSameThread => ConstraintCategory::BusinessLogic,

            CommentConstraints::VehicleReference
            | CommentConstraints::PostReference
            | CommentConstraints::AuthorReference
            | CommentConstraints::ParentReference => ConstraintCategory::Reference,

            CommentConstraints::PrimaryKey => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<CommentConstraints> for String {
    #[inline]
    fn from(val: CommentConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for CommentConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_constraint_parses_back() {
        for constraint in CommentConstraints::iter() {
            let name = constraint.to_string();
            assert!(name.starts_with("comments_"));
            assert_eq!(CommentConstraints::new(&name), Some(constraint));
        }
    }

    #[test]
    fn foreign_keys_are_references() {
        assert_eq!(
            CommentConstraints::ParentReference.categorize(),
            ConstraintCategory::Reference
        );
        assert_eq!(
            CommentConstraints::ParentSameThread.categorize(),
            ConstraintCategory::BusinessLogic
        );
        assert_eq!(CommentConstraints::new("comments_unknown"), None);
    }
}
