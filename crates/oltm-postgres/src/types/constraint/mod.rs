//! Database constraint violations grouped by table.

mod comments;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::comments::CommentConstraints;

/// Any named constraint this crate's migrations create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    Comments(CommentConstraints),
}

/// Categories of database constraint violations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Data validation constraints (format, length, range checks).
    Validation,
    /// Ordering constraints between related rows.
    Chronological,
    /// Domain rules enforced by triggers.
    BusinessLogic,
    /// Foreign keys.
    Reference,
    /// Primary keys and unique indexes.
    Uniqueness,
}

impl ConstraintViolation {
    /// Creates a new [`ConstraintViolation`] from the constraint name.
    ///
    /// Returns `None` if the constraint name is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use oltm_postgres::types::ConstraintViolation;
    ///
    /// assert!(ConstraintViolation::new("comments_parent_id_fkey").is_some());
    /// assert!(ConstraintViolation::new("unknown_constraint").is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        let prefix = constraint.split('_').next()?;
        match prefix {
            "comments" => CommentConstraints::new(constraint).map(Self::Comments),
            _ => None,
        }
    }

    /// Returns the table name associated with this constraint.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConstraintViolation::Comments(_) => "comments",
        }
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::Comments(c) => c.categorize(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::Comments(c) => write!(f, "{c}"),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ConstraintViolation::new(&value).ok_or_else(|| format!("Unknown constraint: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_by_table_prefix() {
        let violation = ConstraintViolation::new("comments_parent_same_thread");
        assert_eq!(
            violation,
            Some(ConstraintViolation::Comments(
                CommentConstraints::ParentSameThread
            ))
        );
        assert_eq!(violation.map(|v| v.table_name()), Some("comments"));
        assert_eq!(ConstraintViolation::new("vehicles_pkey"), None);
    }

    #[test]
    fn serializes_as_constraint_name() -> serde_json::Result<()> {
        let violation = ConstraintViolation::Comments(CommentConstraints::BodyLength);
        let json = serde_json::to_string(&violation)?;
        assert_eq!(json, "\"comments_body_length\"");
        assert_eq!(serde_json::from_str::<ConstraintViolation>(&json)?, violation);
        Ok(())
    }
}
