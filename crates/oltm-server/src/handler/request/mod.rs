//! Request types for HTTP handlers.

mod comments;
mod paths;

pub use comments::*;
pub use paths::*;
