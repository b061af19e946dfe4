//! Diesel models for the tables this crate reads and writes.

mod comment;

pub use comment::{AuthoredComment, Comment, NewComment};
