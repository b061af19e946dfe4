//! Axum extractors used by the handlers.
//!
//! - [`AuthState`]: verified session of the caller
//! - [`Json`], [`Path`], [`ValidateJson`]: request data with JSON error
//!   responses

pub mod auth;
pub mod reject;

pub use crate::TRACING_TARGET_AUTHENTICATION;
pub use crate::extract::auth::{AuthClaims, AuthState, SESSION_COOKIE};
pub use crate::extract::reject::{Json, Path, ValidateJson};
