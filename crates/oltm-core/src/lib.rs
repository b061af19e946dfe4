#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for thread validation.
pub const TRACING_TARGET_VALIDATE: &str = "oltm_core::thread::validate";

/// Tracing target for the comment service.
pub const TRACING_TARGET_SERVICE: &str = "oltm_core::service";

mod comment;
mod error;
mod health;
mod service;
mod store;

pub mod thread;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub use comment::{
    BODY_MIN_CHARS, Comment, CommentCandidate, CommentId, NewComment, Target, TargetError,
    TargetKind, UserId,
};
pub use error::{BoxedError, ConstraintKind, StoreError, StoreResult};
pub use health::{ServiceHealth, ServiceStatus};
pub use service::{CommentError, CommentResult, CommentService};
pub use store::{CommentStore, ParentRef, ThreadLookup};
pub use thread::{Rejection, ThreadNode, assemble, validate};
