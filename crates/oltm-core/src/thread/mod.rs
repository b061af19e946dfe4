//! Reply threads: write-time validation and read-time tree assembly.
//!
//! [`validate`] decides whether a candidate may be inserted and normalizes it.
//! [`assemble`] turns the flat comments of one target into an ordered forest of
//! [`ThreadNode`]s. Neither recurses on the call stack, so arbitrarily deep
//! reply chains are handled in bounded stack space.

mod assemble;
mod node;
mod validate;

pub use assemble::{assemble, newest_first, oldest_first};
pub use node::ThreadNode;
pub use validate::{Rejection, validate};
