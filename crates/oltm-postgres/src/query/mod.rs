//! Repositories implemented on [`PgClient`].
//!
//! Each repository is a trait with one implementation for [`PgClient`], so
//! callers import the trait and call the methods on the client directly.
//!
//! [`PgClient`]: crate::PgClient

pub mod comment;
pub mod target;

pub use comment::CommentRepository;
pub use target::TargetRepository;
