//! Constraint names and other custom database types.

mod constraint;

pub use constraint::{CommentConstraints, ConstraintCategory, ConstraintViolation};
